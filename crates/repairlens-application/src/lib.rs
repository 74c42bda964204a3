//! Orchestration layer for RepairLens.
//!
//! This crate contains the decision pipeline that turns an image and an
//! optional hint into a repair procedure, coordinating the collaborators
//! defined in `repairlens-core`.

pub mod orchestrator;

pub use orchestrator::{RepairOrchestrator, UNKNOWN_DEVICE, fallback_safety_warnings, fallback_steps};
