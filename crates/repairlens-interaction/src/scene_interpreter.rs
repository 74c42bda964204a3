//! Scene analysis and target lock over the Gemini API.

use crate::gemini_client::GeminiClient;
use async_trait::async_trait;
use repairlens_core::collaborator::{SceneAnalysis, SceneInterpreter};
use repairlens_core::{RepairError, Result};

/// [`SceneInterpreter`] backed by a Gemini vision model.
///
/// Constructed without a client it reports Unavailable on every call, which
/// the orchestrator degrades to the unknown-target sentinel.
pub struct GeminiSceneInterpreter {
    client: Option<GeminiClient>,
}

impl GeminiSceneInterpreter {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// An interpreter with no model connection.
    pub fn offline() -> Self {
        Self { client: None }
    }

    fn prompt(hint: Option<&str>) -> String {
        let user_context = hint.unwrap_or("No specific context provided.");
        format!(
            r#"Analyze this image.
1. List all distinct repairable objects you see.
2. Based on the user's note: "{user_context}", identify which single object is the intended target for repair.
3. If the user note is empty, pick the most prominent central object.

Output valid JSON:
{{
    "detected_objects": ["toaster", "table", "screwdriver"],
    "target_object": "Sunbeam Toaster",
    "reasoning": "User mentioned 'heating issue', which applies to the toaster, not the table."
}}"#
        )
    }
}

#[async_trait]
impl SceneInterpreter for GeminiSceneInterpreter {
    async fn lock_target(&self, image: &[u8], hint: Option<&str>) -> Result<SceneAnalysis> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RepairError::unavailable("scene interpreter", "no model configured"))?;

        let text = client.generate_json(&Self::prompt(hint), Some(image)).await?;
        let mut scene: SceneAnalysis = serde_json::from_str(&text)
            .map_err(|err| RepairError::schema("scene analysis", err.to_string()))?;

        if scene.target_object.trim().is_empty() {
            scene.target_object = "Unknown Object".to_string();
        }
        if scene.reasoning.trim().is_empty() {
            scene.reasoning = "Selected most prominent object.".to_string();
        }

        Ok(scene)
    }
}
