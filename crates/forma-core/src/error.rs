//! Error types for the forma application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mode::Mode;

/// A shared error type for the entire forma application.
///
/// Every failure in the system is scoped to a single turn or a single
/// side-effect call; none of these variants is fatal to the process.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FormaError {
    /// Provider boundary failure: gateway unreachable, authentication
    /// rejected, or a reply that does not match the expected schema.
    #[error("Provider error: {message}")]
    Provider {
        status_code: Option<u16>,
        message: String,
    },

    /// The gateway reported a mode that would move backward in the fixed
    /// ordering `Discovery < IntentLock < Builder` without a reset.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: Mode, to: Mode },

    /// The contradiction scan could not run. Callers downgrade this to the
    /// empty-issues outcome; it is never shown to the end user as an error.
    #[error("Critique unavailable: {0}")]
    CritiqueUnavailable(String),

    /// The telemetry webhook rejected or never received a record. Always
    /// swallowed by the sink.
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FormaError {
    /// Creates a Provider error without an HTTP status.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            status_code: None,
            message: message.into(),
        }
    }

    /// Creates a Provider error carrying the upstream HTTP status.
    pub fn provider_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Provider {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Provider error
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Check if this is an InvalidTransition error
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for FormaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FormaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FormaError>`.
pub type Result<T> = std::result::Result<T, FormaError>;
