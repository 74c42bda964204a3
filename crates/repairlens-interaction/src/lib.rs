//! External collaborators for the RepairLens pipeline.
//!
//! Everything in this crate talks to a network service: the Gemini REST API
//! for scene interpretation, step authoring, polishing and exploded-view
//! illustrations; the iFixit public API for verified guides; and the Trellis
//! mesh service for 3D asset generation. Each collaborator implements a trait
//! from `repairlens-core` and is injected into the orchestrator at
//! construction time.

pub mod asset_pipeline;
pub mod gemini_client;
pub mod ifixit_client;
pub mod scene_interpreter;
pub mod step_author;
pub mod step_polisher;

pub use asset_pipeline::TrellisAssetPipeline;
pub use gemini_client::GeminiClient;
pub use ifixit_client::IFixitClient;
pub use scene_interpreter::GeminiSceneInterpreter;
pub use step_author::GeminiStepAuthor;
pub use step_polisher::GeminiStepPolisher;
