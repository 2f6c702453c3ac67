//! Error types for the Suraksh client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Suraksh client.
///
/// The first four variants are the failure kinds a page can surface to the
/// user; the rest describe local failures (storage, configuration, bugs).
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SurakshError {
    /// The request never reached the server (refused, reset, DNS, ...).
    #[error("Connectivity error: {message}")]
    Connectivity { message: String },

    /// The request exceeded its deadline.
    #[error("Request timed out after {timeout_secs}s: {message}")]
    Timeout { timeout_secs: u64, message: String },

    /// The presented credential is missing, invalid or expired (HTTP 401).
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// Malformed persisted record, request payload or response body.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Local file system failure.
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broken invariant or unusable runtime resource.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SurakshError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Connectivity error
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Connectivity error
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    /// Check if this is a Timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is an Authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the message a page should show inline for this error.
    ///
    /// Connectivity and timeout failures carry different remediation advice:
    /// the first points at the backend process, the second at payload size
    /// or the network. Authorization failures are handled by a redirect and
    /// have no dialog text.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Connectivity { message } => Some(format!(
                "Cannot reach the backend. Is the Suraksh backend running? ({message})"
            )),
            Self::Timeout { timeout_secs, .. } => Some(format!(
                "The request took longer than {timeout_secs}s. The payload may be too large or the network too slow."
            )),
            Self::Authorization(_) => None,
            other => Some(other.to_string()),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SurakshError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SurakshError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SurakshError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for SurakshError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            _ => Self::Config(err.to_string()),
        }
    }
}

/// A type alias for `Result<T, SurakshError>`.
pub type Result<T> = std::result::Result<T, SurakshError>;
