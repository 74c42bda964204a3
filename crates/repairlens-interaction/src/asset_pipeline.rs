//! Exploded-view asset pipeline: illustration generation, then remote mesh
//! submission.
//!
//! This is the slow, minutes-scale visual path. It is strictly best-effort:
//! any failure at any stage yields `None` and never reaches the orchestrator
//! as an error. One attempt per stage, no retries.

use crate::gemini_client::GeminiClient;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use repairlens_core::collaborator::AssetPipeline;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// [`AssetPipeline`] backed by a Gemini image model and the Trellis mesh
/// service.
pub struct TrellisAssetPipeline {
    illustrator: Option<GeminiClient>,
    client: Client,
    fal_key: Option<String>,
    endpoint: String,
}

#[derive(Serialize)]
struct TrellisRequest {
    image_url: String,
    slat_cfg_scale: u32,
    ss_cfg_scale: f64,
    slat_sampling_steps: u32,
    ss_sampling_steps: u32,
    seed: u32,
}

impl TrellisAssetPipeline {
    /// Creates the pipeline. Pass `None` for either the illustrator or the
    /// mesh-service key to leave that stage (and hence the pipeline)
    /// disabled.
    pub fn new(
        illustrator: Option<GeminiClient>,
        fal_key: Option<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            illustrator,
            client: Client::new(),
            fal_key,
            endpoint: endpoint.into(),
        }
    }

    fn illustration_prompt(target: &str) -> String {
        format!(
            "Generate an image of a detailed technical exploded view illustration of {target}. \
             All components are separated and floating apart in an isometric perspective, showing \
             their assembly order. Clearly visible parts include fasteners, the outer housing and \
             the major internal assemblies. The style is a clean, technical schematic with guide \
             lines showing how parts connect. Studio lighting, neutral background."
        )
    }

    async fn render_illustration(&self, image: &[u8], target: &str) -> Option<Vec<u8>> {
        let illustrator = match &self.illustrator {
            Some(client) => client,
            None => {
                tracing::debug!("No illustration model configured; skipping 3D generation");
                return None;
            }
        };

        tracing::info!("Generating exploded-view illustration for '{target}'");
        match illustrator
            .generate_image(&Self::illustration_prompt(target), Some(image))
            .await
        {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!("Exploded-view illustration failed: {err}");
                None
            }
        }
    }

    async fn submit_mesh(&self, illustration: &[u8]) -> Option<String> {
        let key = match &self.fal_key {
            Some(key) => key,
            None => {
                tracing::debug!("No mesh service key configured; skipping submission");
                return None;
            }
        };

        let body = TrellisRequest {
            image_url: format!(
                "data:image/png;base64,{}",
                BASE64_STANDARD.encode(illustration)
            ),
            slat_cfg_scale: 3,
            ss_cfg_scale: 7.5,
            slat_sampling_steps: 25,
            ss_sampling_steps: 25,
            seed: 0,
        };

        tracing::info!("Submitting illustration to the mesh service");
        let response = match self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Key {key}"))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Mesh service request failed: {err}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Mesh service returned {}", response.status());
            return None;
        }

        let value: Value = match response.json().await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("Failed to parse mesh service response: {err}");
                return None;
            }
        };

        let data = value.get("data").unwrap_or(&value);
        let url = find_model_mesh(data)
            .and_then(|mesh| mesh.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if url.is_none() {
            tracing::warn!("No model_mesh.url found in mesh service response");
        }
        url
    }
}

/// Recursively searches a nested JSON structure for a `model_mesh` object.
fn find_model_mesh(node: &Value) -> Option<&Value> {
    match node {
        Value::Object(map) => {
            if let Some(mesh) = map.get("model_mesh") {
                if mesh.is_object() {
                    return Some(mesh);
                }
            }
            map.values().find_map(find_model_mesh)
        }
        Value::Array(items) => items.iter().find_map(find_model_mesh),
        _ => None,
    }
}

#[async_trait]
impl AssetPipeline for TrellisAssetPipeline {
    async fn generate(&self, image: Vec<u8>, target: &str) -> Option<String> {
        let illustration = self.render_illustration(&image, target).await?;
        self.submit_mesh(&illustration).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_model_mesh_nested_in_the_response() {
        let response = serde_json::json!({
            "data": {
                "outputs": [
                    {"other": 1},
                    {"result": {"model_mesh": {"url": "https://assets.example/m.glb", "size": 123}}}
                ]
            }
        });

        let mesh = find_model_mesh(&response).unwrap();
        assert_eq!(mesh["url"], "https://assets.example/m.glb");
    }

    #[test]
    fn ignores_non_object_model_mesh_values() {
        let response = serde_json::json!({"model_mesh": "not an object"});
        assert!(find_model_mesh(&response).is_none());
    }

    #[test]
    fn illustration_prompt_names_the_target() {
        let prompt = TrellisAssetPipeline::illustration_prompt("Sunbeam Toaster");
        assert!(prompt.contains("Sunbeam Toaster"));
        assert!(prompt.contains("exploded view"));
    }

    #[tokio::test]
    async fn pipeline_without_illustrator_yields_none() {
        let pipeline = TrellisAssetPipeline::new(None, None, "https://fal.run/fal-ai/trellis");
        let url = pipeline.generate(vec![0xFF, 0xD8], "Toaster").await;
        assert!(url.is_none());
    }
}
