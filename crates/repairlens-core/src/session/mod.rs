//! Session domain model: the per-call state record, step and result types,
//! and the incremental stream events.

pub mod event;
pub mod model;
pub mod result;
pub mod step;

pub use event::StreamEvent;
pub use model::RepairSession;
pub use result::{RepairResult, RepairSource};
pub use step::RepairStep;
