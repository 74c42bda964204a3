//! RepairOrchestrator - the two-path decision pipeline.
//!
//! Sequences scene interpretation, guide lookup, step authoring and
//! polishing, with the exploded-view asset pipeline running as a detached
//! background task that is joined exactly once at the end. Expected failure
//! modes never propagate: every stage degrades to a documented fallback, so
//! an orchestration call always returns a structurally valid result.

use repairlens_core::RepairError;
use repairlens_core::collaborator::{
    AssetPipeline, GuideLookup, SceneInterpreter, StepAuthor, StepPolisher,
};
use repairlens_core::session::{RepairResult, RepairSession, RepairStep, StreamEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Target name used when scene analysis cannot lock an object.
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// Targets containing this marker skip the guide path entirely.
const UNKNOWN_MARKER: &str = "Unknown";

/// Polishing is skipped for procedures longer than this.
const POLISH_STEP_CEILING: usize = 30;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Canned steps used when the generative model is unavailable.
pub fn fallback_steps() -> Vec<RepairStep> {
    vec![
        RepairStep::new(1, "Remove the 4 visible Phillips screws on the back panel."),
        RepairStep::new(2, "Gently pry the seam using a plastic pick.")
            .with_warning("Clips may break if forced."),
    ]
}

/// Canned guide-level warnings paired with the fallback steps.
pub fn fallback_safety_warnings() -> Vec<String> {
    vec![
        "Unplug device before opening".to_string(),
        "Capacitor discharge risk".to_string(),
    ]
}

/// Orchestrates one repair analysis per call.
///
/// Collaborators are explicit dependencies injected once at construction;
/// the orchestrator holds no other state, so a single instance can serve
/// any number of concurrent sessions.
#[derive(Clone)]
pub struct RepairOrchestrator {
    scene: Arc<dyn SceneInterpreter>,
    guides: Arc<dyn GuideLookup>,
    author: Arc<dyn StepAuthor>,
    polisher: Arc<dyn StepPolisher>,
    assets: Arc<dyn AssetPipeline>,
}

impl RepairOrchestrator {
    pub fn new(
        scene: Arc<dyn SceneInterpreter>,
        guides: Arc<dyn GuideLookup>,
        author: Arc<dyn StepAuthor>,
        polisher: Arc<dyn StepPolisher>,
        assets: Arc<dyn AssetPipeline>,
    ) -> Self {
        Self {
            scene,
            guides,
            author,
            polisher,
            assets,
        }
    }

    /// Runs the full pipeline and blocks until the result is ready.
    ///
    /// Never fails for expected failure modes: an offline model, an empty
    /// guide lookup or a parse failure each degrade to their fallback and
    /// the degradation is visible in the reasoning log and the `source` /
    /// `model_url` fields.
    pub async fn process(&self, image: Vec<u8>, hint: Option<String>) -> RepairResult {
        self.run(image, hint, None).await
    }

    /// Runs the same pipeline, emitting every reasoning-log line as a `log`
    /// event the moment it is appended, terminated by exactly one `result`
    /// event carrying the same record `process` would have returned.
    ///
    /// Each call re-runs the whole pipeline, model calls included; the
    /// stream is not a resumable cursor. Dropping the receiver early stops
    /// event delivery but does not cancel the background asset task, which
    /// runs to completion orphaned.
    pub fn process_streaming(
        &self,
        image: Vec<u8>,
        hint: Option<String>,
    ) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let orchestrator = self.clone();

        tokio::spawn(async move {
            let result = orchestrator.run(image, hint, Some(tx.clone())).await;
            let _ = tx.send(StreamEvent::Result(Box::new(result))).await;
        });

        rx
    }

    async fn run(
        &self,
        image: Vec<u8>,
        hint: Option<String>,
        events: Option<mpsc::Sender<StreamEvent>>,
    ) -> RepairResult {
        let events = events.as_ref();
        let mut session = RepairSession::new(image, hint);
        self.log(&mut session, events, "Starting repair analysis session.".to_string())
            .await;

        self.lock_target(&mut session, events).await;

        // The slow visual path overlaps the whole remaining textual flow.
        // It gets copies of the image and target, never the session itself.
        let asset_task = {
            let assets = Arc::clone(&self.assets);
            let image = session.image.clone();
            let target = session.target_device.clone();
            tokio::spawn(async move { assets.generate(image, &target).await })
        };
        self.log(
            &mut session,
            events,
            "Exploded-view generation started in the background.".to_string(),
        )
        .await;

        let verified = if session.target_device.contains(UNKNOWN_MARKER) {
            false
        } else {
            let message = format!(
                "Searching the guide repository for '{}'...",
                session.target_device
            );
            self.log(&mut session, events, message).await;

            let outcome = self.verified_path(&mut session, events).await;
            match outcome {
                Ok(found) => found,
                Err(err) => {
                    self.log(&mut session, events, format!("Guide lookup failed: {err}"))
                        .await;
                    false
                }
            }
        };

        if verified {
            self.log(
                &mut session,
                events,
                "Path A selected: using the official guide.".to_string(),
            )
            .await;
            session.safety_warnings = vec!["Follow the official guide strictly.".to_string()];
        } else {
            self.log(
                &mut session,
                events,
                "Path B selected: generative reasoning mode.".to_string(),
            )
            .await;
            self.generative_path(&mut session, events).await;
        }

        self.polish(&mut session, events).await;

        session.model_url = match asset_task.await {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!("Asset task failed to join: {err}");
                None
            }
        };
        let message = match &session.model_url {
            Some(url) => format!("Exploded-view asset ready: {url}"),
            None => "Exploded-view asset unavailable.".to_string(),
        };
        self.log(&mut session, events, message).await;

        self.log(&mut session, events, "Session complete.".to_string())
            .await;

        let result = session.into_result();
        tracing::info!(
            source = %result.source,
            steps = result.steps.len(),
            has_asset = result.model_url.is_some(),
            "Repair session finished"
        );
        result
    }

    /// Scene analysis and target lock. Failure locks the unknown sentinel.
    async fn lock_target(
        &self,
        session: &mut RepairSession,
        events: Option<&mpsc::Sender<StreamEvent>>,
    ) {
        let user_context = session
            .hint
            .clone()
            .unwrap_or_else(|| "No specific context provided.".to_string());
        let message = format!("Analyzing scene. User context: '{user_context}'");
        self.log(session, events, message).await;

        let locked = self
            .scene
            .lock_target(&session.image, session.hint.as_deref())
            .await;

        match locked {
            Ok(scene) => {
                let seen = format!("Scene analysis: saw {:?}.", scene.detected_objects);
                self.log(session, events, seen).await;
                let lock = format!(
                    "Target lock: selected '{}'. Reason: {}",
                    scene.target_object, scene.reasoning
                );
                self.log(session, events, lock).await;

                session.detected_objects = scene.detected_objects;
                session.target_device = scene.target_object;
            }
            Err(err) if err.is_unavailable() => {
                self.log(
                    session,
                    events,
                    "AI offline. Defaulting to unknown device.".to_string(),
                )
                .await;
                session.target_device = UNKNOWN_DEVICE.to_string();
            }
            Err(err) => {
                self.log(session, events, format!("Scene analysis failed: {err}"))
                    .await;
                session.target_device = UNKNOWN_DEVICE.to_string();
            }
        }
    }

    /// Path A. Returns true when a verified guide supplied the steps.
    async fn verified_path(
        &self,
        session: &mut RepairSession,
        events: Option<&mpsc::Sender<StreamEvent>>,
    ) -> repairlens_core::Result<bool> {
        let target = session.target_device.clone();

        let found = self.guides.find_best_device(&target).await?;
        let Some(device) = found else {
            self.log(
                session,
                events,
                "No exact match in the guide repository.".to_string(),
            )
            .await;
            return Ok(false);
        };

        let message = format!("Guide repository match found: {}.", device.label());
        self.log(session, events, message).await;

        let Some(category) = device.category_title() else {
            self.log(
                session,
                events,
                "Matched device has no usable category title.".to_string(),
            )
            .await;
            return Ok(false);
        };

        let guides = self.guides.guides_for(category).await?;
        if guides.is_empty() {
            self.log(
                session,
                events,
                "No verified guides published for this device.".to_string(),
            )
            .await;
            return Ok(false);
        }
        let message = format!("Found {} verified guides.", guides.len());
        self.log(session, events, message).await;

        // Only the first (best) guide is fetched in full.
        let mut steps = Vec::new();
        if let Some(guide_id) = guides[0].guideid {
            let detail = self.guides.guide_detail(guide_id).await?;
            steps = detail
                .steps
                .iter()
                .map(|raw| RepairStep::new(0, raw.instruction()))
                .collect::<Vec<_>>();
            RepairStep::renumber(&mut steps);
        }

        if steps.is_empty() {
            self.log(
                session,
                events,
                "Verified guide had no usable steps.".to_string(),
            )
            .await;
            return Ok(false);
        }

        session.guides_available = guides
            .iter()
            .filter_map(|guide| serde_json::to_value(guide).ok())
            .collect();
        session.steps = steps;
        session.is_verified = true;
        Ok(true)
    }

    /// Path B. Total: always leaves a non-empty step list behind.
    async fn generative_path(
        &self,
        session: &mut RepairSession,
        events: Option<&mpsc::Sender<StreamEvent>>,
    ) {
        let target = session.target_device.clone();
        let message = format!("Engaging generative repair logic for '{target}'...");
        self.log(session, events, message).await;

        let outcome = self
            .author
            .synthesize(&target, &session.image, session.hint.as_deref())
            .await;

        let authored = match outcome {
            Ok(guide) if !guide.steps.is_empty() => Some(guide),
            Ok(_) => {
                self.log(
                    session,
                    events,
                    "Generative model returned no steps.".to_string(),
                )
                .await;
                None
            }
            Err(err) => {
                self.log(session, events, format!("Generative reasoning failed: {err}"))
                    .await;
                None
            }
        };

        match authored {
            Some(mut guide) => {
                RepairStep::renumber(&mut guide.steps);
                let message = format!(
                    "Generated {} repair steps via visual analysis.",
                    guide.steps.len()
                );
                self.log(session, events, message).await;
                session.steps = guide.steps;
                session.safety_warnings = guide.safety_warnings;
            }
            None => {
                self.log(
                    session,
                    events,
                    "Falling back to generic disassembly steps.".to_string(),
                )
                .await;
                session.steps = fallback_steps();
                session.safety_warnings = fallback_safety_warnings();
            }
        }
    }

    /// Best-effort polish. Keeps the original steps on unavailability, on a
    /// count mismatch, or when the procedure exceeds the size ceiling.
    async fn polish(
        &self,
        session: &mut RepairSession,
        events: Option<&mpsc::Sender<StreamEvent>>,
    ) {
        if session.steps.len() > POLISH_STEP_CEILING {
            let message = format!(
                "Skipping polish: {} steps exceeds the ceiling of {POLISH_STEP_CEILING}.",
                session.steps.len()
            );
            self.log(session, events, message).await;
            return;
        }

        let outcome = self.polisher.polish(&session.steps).await;
        match outcome {
            Ok(mut polished) if polished.len() == session.steps.len() => {
                RepairStep::renumber(&mut polished);
                session.steps = polished;
                self.log(session, events, "Steps polished for clarity.".to_string())
                    .await;
            }
            Ok(polished) => {
                let err = RepairError::CountMismatch {
                    expected: session.steps.len(),
                    actual: polished.len(),
                };
                let message = format!("Warning: polish rejected ({err}); keeping original steps.");
                self.log(session, events, message).await;
            }
            Err(err) => {
                let message = format!("Polish unavailable ({err}); keeping original steps.");
                self.log(session, events, message).await;
            }
        }
    }

    /// Appends one line to the session's reasoning log and mirrors it to the
    /// event stream when one is attached. Delivery is best-effort: the
    /// receiver may already be gone.
    async fn log(
        &self,
        session: &mut RepairSession,
        events: Option<&mpsc::Sender<StreamEvent>>,
        message: String,
    ) {
        tracing::debug!(target: "repair", "{message}");
        session.reasoning_log.push(message.clone());
        if let Some(events) = events {
            let _ = events.send(StreamEvent::Log(message)).await;
        }
    }
}
