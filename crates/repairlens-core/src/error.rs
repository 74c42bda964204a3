//! Error types for the RepairLens pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the repair pipeline and its collaborators.
///
/// Every variant corresponds to an expected failure mode: the orchestrator
/// degrades on all of them, so none of these errors escape an orchestration
/// call.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RepairError {
    /// External model or service is not configured or not reachable.
    #[error("Service unavailable: {service} ({reason})")]
    Unavailable { service: String, reason: String },

    /// HTTP transport failure or non-success status from a collaborator.
    #[error("HTTP error: {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },

    /// Collaborator returned data that does not parse into the expected shape.
    #[error("Schema violation ({context}): {message}")]
    Schema { context: String, message: String },

    /// A rewrite stage returned a different number of steps than it was given.
    #[error("Step count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepairError {
    /// Creates an Unavailable error
    pub fn unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Creates an Http error
    pub fn http(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a Schema error
    pub fn schema(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is an Unavailable error
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Check if this is a Schema error
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

impl From<std::io::Error> for RepairError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RepairError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema {
            context: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RepairError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<reqwest::Error> for RepairError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RepairError>`.
pub type Result<T> = std::result::Result<T, RepairError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_carries_service_name() {
        let err = RepairError::unavailable("scene interpreter", "no API key");
        assert!(err.is_unavailable());
        assert_eq!(
            err.to_string(),
            "Service unavailable: scene interpreter (no API key)"
        );
    }

    #[test]
    fn json_errors_become_schema_violations() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = RepairError::from(parse_err);
        assert!(err.is_schema());
    }

    #[test]
    fn count_mismatch_display() {
        let err = RepairError::CountMismatch {
            expected: 5,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Step count mismatch: expected 5, got 3");
    }
}
