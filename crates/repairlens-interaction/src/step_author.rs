//! Generative step authoring over the Gemini API.

use crate::gemini_client::GeminiClient;
use async_trait::async_trait;
use repairlens_core::collaborator::{AuthoredGuide, StepAuthor};
use repairlens_core::{RepairError, Result};

/// [`StepAuthor`] backed by a Gemini vision model. Used only when the target
/// has no verified guide.
pub struct GeminiStepAuthor {
    client: Option<GeminiClient>,
}

impl GeminiStepAuthor {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// An author with no model connection.
    pub fn offline() -> Self {
        Self { client: None }
    }

    fn prompt(target: &str, hint: Option<&str>) -> String {
        let user_context = hint.unwrap_or("");
        format!(
            r#"Create a repair guide for the '{target}'.
Context from user: "{user_context}".

Based on the visual evidence (screws, seams, clips), provide a step-by-step disassembly/repair guide.
Focus on the specific issue if mentioned in the context.

Output valid JSON format:
{{
    "steps": [
        {{"step": 1, "instruction": "Remove the 4 visible screws...", "warning": "Be careful of..."}}
    ],
    "safety_warnings": ["Unplug device...", "Wear safety glasses..."]
}}"#
        )
    }
}

#[async_trait]
impl StepAuthor for GeminiStepAuthor {
    async fn synthesize(
        &self,
        target: &str,
        image: &[u8],
        hint: Option<&str>,
    ) -> Result<AuthoredGuide> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RepairError::unavailable("step author", "no model configured"))?;

        let text = client
            .generate_json(&Self::prompt(target, hint), Some(image))
            .await?;

        serde_json::from_str(&text)
            .map_err(|err| RepairError::schema("authored guide", err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_author_reports_unavailable() {
        let author = GeminiStepAuthor::offline();
        let err = author
            .synthesize("Sunbeam Toaster", &[0xFF, 0xD8], None)
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn prompt_names_the_target_and_schema() {
        let prompt = GeminiStepAuthor::prompt("Sunbeam Toaster", Some("lever stuck"));
        assert!(prompt.contains("'Sunbeam Toaster'"));
        assert!(prompt.contains("lever stuck"));
        assert!(prompt.contains("safety_warnings"));
    }
}
