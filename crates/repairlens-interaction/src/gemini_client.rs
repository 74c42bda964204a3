//! GeminiClient - Direct REST API implementation for Gemini.
//!
//! This client calls the Gemini REST API directly without CLI dependency.
//! It is shared by the scene interpreter, step author, step polisher and the
//! illustration stage of the asset pipeline.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use repairlens_core::{RepairError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Thin client for the Gemini HTTP API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a new client with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sends a prompt (plus an optional inline image) and returns the JSON
    /// text the model was instructed to produce.
    pub async fn generate_json(&self, prompt: &str, image: Option<&[u8]>) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: build_parts(prompt, image),
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_modalities: None,
            }),
        };

        let response = self.send_request(&request).await?;
        extract_text(response)
    }

    /// Asks an image-output model for a picture and returns its raw bytes.
    pub async fn generate_image(&self, prompt: &str, image: Option<&[u8]>) -> Result<Vec<u8>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: build_parts(prompt, image),
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_modalities: Some(vec!["IMAGE".to_string()]),
            }),
        };

        let response = self.send_request(&request).await?;
        extract_image(response)
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| RepairError::http(None, format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response
            .json()
            .await
            .map_err(|err| RepairError::schema("gemini response", err.to_string()))
    }
}

fn build_parts(prompt: &str, image: Option<&[u8]>) -> Vec<Part> {
    let mut parts = vec![Part::Text {
        text: prompt.to_string(),
    }];

    if let Some(bytes) = image {
        parts.push(Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: sniff_image_mime(bytes).to_string(),
                data: BASE64_STANDARD.encode(bytes),
            },
        });
    }

    parts
}

/// Guesses the image MIME type from magic bytes. The API rejects
/// `application/octet-stream` for image parts, so unrecognized input is sent
/// as JPEG.
fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(
        rename = "generationConfig",
        skip_serializing_if = "Option::is_none"
    )]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(
        rename = "responseMimeType",
        skip_serializing_if = "Option::is_none"
    )]
    response_mime_type: Option<String>,
    #[serde(
        rename = "responseModalities",
        skip_serializing_if = "Option::is_none"
    )]
    response_modalities: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
struct InlineDataResponse {
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            RepairError::schema(
                "gemini response",
                "Gemini API returned no text in the response candidates",
            )
        })
}

fn extract_image(response: GenerateContentResponse) -> Result<Vec<u8>> {
    let encoded = response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| {
            content
                .parts
                .into_iter()
                .find_map(|part| part.inline_data)
        })
        .ok_or_else(|| {
            RepairError::schema(
                "gemini response",
                "Gemini API returned no inline image in the response candidates",
            )
        })?;

    BASE64_STANDARD
        .decode(encoded.data.as_bytes())
        .map_err(|err| RepairError::schema("gemini image", err.to_string()))
}

fn map_http_error(status: StatusCode, body: String) -> RepairError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    RepairError::http(Some(status.as_u16()), message)
}
