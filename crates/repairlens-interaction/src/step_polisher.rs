//! Step polishing: rewrites instructions for brevity without changing
//! count or order.

use crate::gemini_client::GeminiClient;
use async_trait::async_trait;
use repairlens_core::collaborator::StepPolisher;
use repairlens_core::session::RepairStep;
use repairlens_core::{RepairError, Result};
use serde::Deserialize;

/// [`StepPolisher`] backed by a Gemini text model.
///
/// The count/order invariant is enforced by the orchestrator; this
/// collaborator only asks for it and reports what came back.
pub struct GeminiStepPolisher {
    client: Option<GeminiClient>,
}

#[derive(Deserialize)]
struct PolishResponse {
    #[serde(default)]
    steps: Vec<RepairStep>,
}

impl GeminiStepPolisher {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A polisher with no model connection.
    pub fn offline() -> Self {
        Self { client: None }
    }

    fn prompt(steps_json: &str) -> String {
        format!(
            r#"Rewrite the following repair steps into concise, consistent phrasing.
Keep exactly the same number of steps, in the same order. Keep each step's
"step" number and "warning" value unchanged; only rewrite the "instruction" text.

Steps:
{steps_json}

Output valid JSON format:
{{
    "steps": [
        {{"step": 1, "instruction": "...", "warning": null}}
    ]
}}"#
        )
    }
}

#[async_trait]
impl StepPolisher for GeminiStepPolisher {
    async fn polish(&self, steps: &[RepairStep]) -> Result<Vec<RepairStep>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RepairError::unavailable("step polisher", "no model configured"))?;

        let steps_json = serde_json::to_string_pretty(steps)?;
        let text = client
            .generate_json(&Self::prompt(&steps_json), None)
            .await?;

        let response: PolishResponse = serde_json::from_str(&text)
            .map_err(|err| RepairError::schema("polished steps", err.to_string()))?;

        Ok(response.steps)
    }
}
