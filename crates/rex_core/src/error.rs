use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for export requests and the service around them.
#[derive(Error, Debug)]
pub enum RexError {
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rejected payload: {0}")]
    Rejected(String),

    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of errors for logging and response selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// The caller can fix the request and resubmit.
    ClientError,
    /// The payload was refused by the security guard.
    SecurityError,
    /// Something failed on our side.
    SystemError,
}

impl RexError {
    /// Returns the broad error category for routing and display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedJson(_) | Self::InvalidRequest(_) | Self::PayloadTooLarge { .. } => {
                ErrorCategory::ClientError
            }
            Self::Rejected(_) => ErrorCategory::SecurityError,
            Self::Render(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                ErrorCategory::SystemError
            }
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedJson(_) | Self::InvalidRequest(_) | Self::Rejected(_) => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::Render(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns a user-friendly message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedJson(_) => "Invalid JSON in request body".into(),
            Self::InvalidRequest(msg) => msg.clone(),
            Self::Rejected(_) => "Request contains disallowed content".into(),
            Self::PayloadTooLarge { limit, .. } => {
                format!("Request body exceeds the {limit}-byte limit")
            }
            Self::Render(msg) => format!("Failed to generate export: {msg}"),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                "An unexpected error occurred.".into()
            }
        }
    }
}
