//! Guide repository records.
//!
//! These mirror the fields the pipeline actually reads from the external
//! guide API; everything else is preserved in the flattened `raw` maps so
//! results can carry the original records untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Best-match device returned by the repository search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

impl DeviceMatch {
    /// The key used for category guide lookups: `title` with
    /// `display_title` as fallback.
    pub fn category_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.display_title.as_deref().filter(|t| !t.is_empty()))
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> &str {
        self.display_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.title.as_deref().filter(|t| !t.is_empty()))
            .unwrap_or("unnamed device")
    }
}

/// Summary entry in a device's guide list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideSummary {
    #[serde(default)]
    pub guideid: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

/// Full guide detail, reduced to its steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideDetail {
    #[serde(default)]
    pub steps: Vec<GuideStep>,
}

/// One raw step of an official guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideStep {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lines: Vec<GuideLine>,
}

/// One text line inside a raw guide step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    #[serde(default)]
    pub text_raw: String,
}

impl GuideStep {
    /// Maps the raw step to instruction text: the line texts joined by
    /// single spaces, falling back to the step title, then to "Step".
    pub fn instruction(&self) -> String {
        let joined = self
            .lines
            .iter()
            .map(|l| l.text_raw.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim();

        if !joined.is_empty() {
            return joined.to_string();
        }
        if !self.title.trim().is_empty() {
            return self.title.clone();
        }
        "Step".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> GuideLine {
        GuideLine {
            text_raw: text.to_string(),
        }
    }

    #[test]
    fn instruction_joins_lines_with_single_spaces() {
        let step = GuideStep {
            title: "Open the case".to_string(),
            lines: vec![line("Remove the screws."), line("Lift the cover.")],
        };
        assert_eq!(step.instruction(), "Remove the screws. Lift the cover.");
    }

    #[test]
    fn empty_line_text_falls_back_to_title() {
        let step = GuideStep {
            title: "Disconnect the battery".to_string(),
            lines: vec![line(""), line("")],
        };
        assert_eq!(step.instruction(), "Disconnect the battery");
    }

    #[test]
    fn blank_step_falls_back_to_placeholder() {
        let step = GuideStep::default();
        assert_eq!(step.instruction(), "Step");
    }

    #[test]
    fn category_title_prefers_title_then_display_title() {
        let device = DeviceMatch {
            title: Some("iPhone 13".to_string()),
            display_title: Some("Apple iPhone 13".to_string()),
            raw: Map::new(),
        };
        assert_eq!(device.category_title(), Some("iPhone 13"));
        assert_eq!(device.label(), "Apple iPhone 13");

        let device = DeviceMatch {
            title: None,
            display_title: Some("Apple iPhone 13".to_string()),
            raw: Map::new(),
        };
        assert_eq!(device.category_title(), Some("Apple iPhone 13"));
    }

    #[test]
    fn unknown_fields_are_preserved_in_raw() {
        let json = r#"{"guideid": 42, "title": "Battery Replacement", "difficulty": "Moderate"}"#;
        let summary: GuideSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.guideid, Some(42));
        assert_eq!(summary.raw["difficulty"], "Moderate");

        let back = serde_json::to_value(&summary).unwrap();
        assert_eq!(back["difficulty"], "Moderate");
        assert_eq!(back["guideid"], 42);
    }
}
