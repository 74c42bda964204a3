//! Contracts for the pipeline's external collaborators.
//!
//! The orchestrator only ever sees these traits; concrete implementations
//! live in `repairlens-interaction` and are injected once at construction
//! time. Every method returns a typed error for its expected failure modes;
//! a collaborator must never let a raw parse failure or panic escape.

use crate::error::Result;
use crate::guide::{DeviceMatch, GuideDetail, GuideSummary};
use crate::session::RepairStep;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of scene analysis: what was seen and which object was locked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneAnalysis {
    /// Distinct repairable objects detected in the image.
    #[serde(default)]
    pub detected_objects: Vec<String>,
    /// The single object locked as the repair target.
    #[serde(default)]
    pub target_object: String,
    /// Human-readable rationale for the lock.
    #[serde(default)]
    pub reasoning: String,
}

/// A guide synthesized by the generative path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoredGuide {
    #[serde(default)]
    pub steps: Vec<RepairStep>,
    #[serde(default)]
    pub safety_warnings: Vec<String>,
}

/// Locks a repair target from an image and an optional user hint.
#[async_trait]
pub trait SceneInterpreter: Send + Sync {
    /// Returns the detected-object list, the locked target and a rationale.
    ///
    /// Parse failures from the underlying model surface as
    /// [`RepairError::Schema`](crate::RepairError::Schema), an offline model
    /// as [`RepairError::Unavailable`](crate::RepairError::Unavailable).
    async fn lock_target(&self, image: &[u8], hint: Option<&str>) -> Result<SceneAnalysis>;
}

/// Synthesizes a step list when no verified guide exists.
#[async_trait]
pub trait StepAuthor: Send + Sync {
    async fn synthesize(
        &self,
        target: &str,
        image: &[u8],
        hint: Option<&str>,
    ) -> Result<AuthoredGuide>;
}

/// Rewrites step instructions for brevity, preserving count and order.
#[async_trait]
pub trait StepPolisher: Send + Sync {
    async fn polish(&self, steps: &[RepairStep]) -> Result<Vec<RepairStep>>;
}

/// Queries the external guide repository.
///
/// Implementations degrade transport errors to "not found" (None / empty);
/// the orchestrator treats that identically to "no match".
#[async_trait]
pub trait GuideLookup: Send + Sync {
    /// Server-side best match for the named object, at most one.
    async fn find_best_device(&self, name: &str) -> Result<Option<DeviceMatch>>;

    /// Official guide summaries for a device category.
    async fn guides_for(&self, category: &str) -> Result<Vec<GuideSummary>>;

    /// Full detail of one guide, including its raw steps.
    async fn guide_detail(&self, guide_id: u64) -> Result<GuideDetail>;
}

/// Two-stage best-effort exploded-view pipeline: illustration generation,
/// then remote mesh submission.
///
/// Slow (minutes-scale). Either stage failing yields `None` for the whole
/// pipeline; it never raises into the orchestrator. One attempt per stage.
#[async_trait]
pub trait AssetPipeline: Send + Sync {
    /// Produces a hosted 3D asset URL, or `None` on any failure.
    async fn generate(&self, image: Vec<u8>, target: &str) -> Option<String>;
}
