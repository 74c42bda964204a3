use serde::{Deserialize, Serialize};

use super::result::RepairResult;

/// Incremental events emitted by the streaming pipeline.
///
/// A stream is an ordered sequence of `Log` events terminated by exactly one
/// `Result` event, always last. There are no other event kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// One reasoning-log line, emitted as soon as it is appended.
    Log(String),
    /// The terminal result of the pipeline.
    Result(Box<RepairResult>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{RepairSource, RepairStep};

    #[test]
    fn log_event_wire_shape() {
        let event = StreamEvent::Log("Target Lock: Selected 'Toaster'.".to_string());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "log");
        assert_eq!(json["data"], "Target Lock: Selected 'Toaster'.");
    }

    #[test]
    fn result_event_wire_shape_roundtrips() {
        let result = RepairResult {
            source: RepairSource::Verified,
            device: "iPhone 13".to_string(),
            steps: vec![RepairStep::new(1, "Remove the pentalobe screws")],
            safety: vec!["Follow the official guide strictly.".to_string()],
            guides_available: Some(vec![serde_json::json!({"guideid": 42})]),
            reasoning_log: vec!["Starting repair analysis session.".to_string()],
            model_url: Some("https://assets.example/model.glb".to_string()),
        };
        let event = StreamEvent::Result(Box::new(result));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "result");
        assert_eq!(json["data"]["source"], "verified");

        let back: StreamEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
