//! Per-call session record.
//!
//! This is the "pure" state that the orchestrator folds stage outputs into.
//! It exists for exactly one orchestration call and is consumed into a
//! [`RepairResult`] when the call finishes; there is no cross-session state.

use super::result::{RepairResult, RepairSource};
use super::step::RepairStep;
use serde_json::Value;
use uuid::Uuid;

/// Ephemeral state for a single orchestration call.
///
/// Mutated only by the orchestrator as each stage completes. The image bytes
/// are owned exclusively by the session; the background asset task receives
/// its own copy at launch time, so later mutation here cannot race with it.
#[derive(Debug, Clone)]
pub struct RepairSession {
    /// Unique session identifier (UUID format).
    pub id: String,
    /// Timestamp when the session was created (ISO 8601 format).
    pub created_at: String,
    /// Raw image bytes for this call.
    pub image: Vec<u8>,
    /// Optional free-text hint from the user.
    pub hint: Option<String>,
    /// Append-only human-readable trace; insertion order is significant.
    pub reasoning_log: Vec<String>,
    /// Objects seen in the scene, unordered.
    pub detected_objects: Vec<String>,
    /// Locked target name; empty until scene analysis completes, then fixed.
    pub target_device: String,
    /// True when an official guide supplied the steps.
    pub is_verified: bool,
    pub steps: Vec<RepairStep>,
    /// Guide-level safety warnings.
    pub safety_warnings: Vec<String>,
    /// Raw guide records from the repository, opaque to the pipeline.
    pub guides_available: Vec<Value>,
    /// Hosted exploded-view asset URL once the background task has joined.
    pub model_url: Option<String>,
}

impl RepairSession {
    /// Creates a fresh session owning the given image bytes.
    pub fn new(image: Vec<u8>, hint: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            image,
            hint,
            reasoning_log: Vec::new(),
            detected_objects: Vec::new(),
            target_device: String::new(),
            is_verified: false,
            steps: Vec::new(),
            safety_warnings: Vec::new(),
            guides_available: Vec::new(),
            model_url: None,
        }
    }

    /// The source tag this session resolves to.
    pub fn source(&self) -> RepairSource {
        if self.is_verified {
            RepairSource::Verified
        } else {
            RepairSource::Generated
        }
    }

    /// Consumes the session into its terminal immutable record.
    ///
    /// `guides_available` is only carried when non-empty, which keeps the
    /// invariant that it is present exactly on the verified path.
    pub fn into_result(self) -> RepairResult {
        let source = self.source();
        RepairResult {
            source,
            device: self.target_device,
            steps: self.steps,
            safety: self.safety_warnings,
            guides_available: if self.guides_available.is_empty() {
                None
            } else {
                Some(self.guides_available)
            },
            reasoning_log: self.reasoning_log,
            model_url: self.model_url,
        }
    }
}
