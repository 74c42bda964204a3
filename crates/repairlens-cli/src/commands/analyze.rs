//! The analyze command: wires collaborators into the orchestrator and runs
//! one session against an image file.

use anyhow::{Context, Result};
use repairlens_application::RepairOrchestrator;
use repairlens_core::config::{AppConfig, SecretConfig};
use repairlens_interaction::{
    GeminiClient, GeminiSceneInterpreter, GeminiStepAuthor, GeminiStepPolisher, IFixitClient,
    TrellisAssetPipeline,
};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(
    image: PathBuf,
    hint: Option<String>,
    stream: bool,
    pretty: bool,
    offline: bool,
) -> Result<()> {
    let config = AppConfig::load()?;
    let secrets = if offline {
        SecretConfig::default()
    } else {
        SecretConfig::load()?
    };

    let orchestrator = build_orchestrator(&config, &secrets)?;

    let bytes = std::fs::read(&image)
        .with_context(|| format!("Failed to read image at {}", image.display()))?;

    if stream {
        let mut rx = orchestrator.process_streaming(bytes, hint);
        while let Some(event) = rx.recv().await {
            println!("{}", serde_json::to_string(&event)?);
        }
    } else {
        let result = orchestrator.process(bytes, hint).await;
        let json = if pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };
        println!("{json}");
    }

    Ok(())
}

fn build_orchestrator(config: &AppConfig, secrets: &SecretConfig) -> Result<RepairOrchestrator> {
    let text_model = secrets
        .google_api_key()
        .map(|key| GeminiClient::new(key, config.gemini_model.clone()));
    let image_model = secrets
        .google_api_key()
        .map(|key| GeminiClient::new(key, config.gemini_image_model.clone()));

    if text_model.is_none() {
        tracing::warn!("No Google API key configured; model-backed stages will degrade");
    }

    let scene = match text_model.clone() {
        Some(client) => GeminiSceneInterpreter::new(client),
        None => GeminiSceneInterpreter::offline(),
    };
    let author = match text_model.clone() {
        Some(client) => GeminiStepAuthor::new(client),
        None => GeminiStepAuthor::offline(),
    };
    let polisher = match text_model {
        Some(client) => GeminiStepPolisher::new(client),
        None => GeminiStepPolisher::offline(),
    };

    let guides = IFixitClient::new(&config.guide_api_url)?;
    let assets = TrellisAssetPipeline::new(
        image_model,
        secrets.fal_key().map(str::to_string),
        config.mesh_endpoint.clone(),
    );

    Ok(RepairOrchestrator::new(
        Arc::new(scene),
        Arc::new(guides),
        Arc::new(author),
        Arc::new(polisher),
        Arc::new(assets),
    ))
}
