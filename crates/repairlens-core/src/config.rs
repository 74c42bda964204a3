//! Configuration file management for RepairLens.
//!
//! Application settings live in `~/.config/repairlens/config.toml` and API
//! keys in `~/.config/repairlens/secret.json`. Both files are optional: a
//! missing config file yields the defaults, and missing keys leave the
//! corresponding collaborators in their offline (degraded) state.

use crate::error::{RepairError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Application settings loaded from config.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the guide repository API.
    pub guide_api_url: String,
    /// Model used for scene interpretation, step authoring and polishing.
    pub gemini_model: String,
    /// Image-output model used for exploded-view illustrations.
    pub gemini_image_model: String,
    /// Endpoint of the remote mesh-generation service.
    pub mesh_endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            guide_api_url: "https://www.ifixit.com/api/2.0".to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_image_model: "gemini-2.5-flash-image".to_string(),
            mesh_endpoint: "https://fal.run/fal-ai/trellis".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from `~/.config/repairlens/config.toml`.
    ///
    /// A missing file is not an error; defaults are returned.
    pub fn load() -> Result<Self> {
        Self::load_from(config_dir()?.join("config.toml"))
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            RepairError::config(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(toml::from_str(&content)?)
    }
}

/// API keys loaded from secret.json.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default)]
    pub fal_key: Option<String>,
}

impl SecretConfig {
    /// Loads secrets from `~/.config/repairlens/secret.json`.
    ///
    /// A missing file is not an error; empty secrets are returned and the
    /// pipeline runs in degraded mode.
    pub fn load() -> Result<Self> {
        Self::load_from(config_dir()?.join("secret.json"))
    }

    /// Loads secrets from an explicit path.
    ///
    /// Error messages never contain secret values.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            RepairError::config(format!(
                "Failed to read secret file at {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            RepairError::config(format!(
                "Failed to parse secret file at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Returns the Google API key, treating an empty string as absent.
    pub fn google_api_key(&self) -> Option<&str> {
        self.google_api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Returns the mesh-service key, treating an empty string as absent.
    pub fn fal_key(&self) -> Option<&str> {
        self.fal_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Returns the configuration directory: ~/.config/repairlens
fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RepairError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("repairlens"))
}
