//! Terminal result record.

use super::step::RepairStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a repair procedure came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RepairSource {
    /// Sourced from an official guide in the external repository.
    Verified,
    /// Synthesized by the generative model from image + context.
    Generated,
}

/// The immutable record returned by one orchestration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairResult {
    pub source: RepairSource,
    /// Locked target device name.
    pub device: String,
    /// Ordered steps, numbered 1..N.
    pub steps: Vec<RepairStep>,
    /// Guide-level safety warnings, separate from per-step warnings.
    pub safety: Vec<String>,
    /// Raw guide records; present only on the verified path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guides_available: Option<Vec<Value>>,
    /// Full reasoning-log snapshot in append order.
    #[serde(default)]
    pub reasoning_log: Vec<String>,
    /// Hosted exploded-view asset URL, when the background task succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RepairSource::Verified).unwrap(),
            "\"verified\""
        );
        assert_eq!(
            serde_json::to_string(&RepairSource::Generated).unwrap(),
            "\"generated\""
        );
        assert_eq!(RepairSource::Verified.to_string(), "verified");
    }

    #[test]
    fn absent_optionals_are_omitted_from_json() {
        let result = RepairResult {
            source: RepairSource::Generated,
            device: "Toaster".to_string(),
            steps: vec![RepairStep::new(1, "Unplug it")],
            safety: vec!["Unplug device before opening".to_string()],
            guides_available: None,
            reasoning_log: vec!["session start".to_string()],
            model_url: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("guides_available").is_none());
        assert!(json.get("model_url").is_none());
        assert_eq!(json["source"], "generated");
    }
}
