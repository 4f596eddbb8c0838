//! # Client Error Types
//!
//! Unified error handling for every resource client. All HTTP status failures
//! are produced by the transport and propagate unchanged to the caller.

use thiserror::Error;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Comprehensive error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        error_code: Option<String>,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        error_code: Option<String>,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        error_code: Option<String>,
    },

    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
        error_code: Option<String>,
    },

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        error_code: Option<String>,
    },

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid response: {field} - {reason}")]
    InvalidResponse { field: String, reason: String },
}

impl ClientError {
    /// Map an unexpected HTTP status and the server-provided message to an error
    pub fn from_status(status: u16, message: impl Into<String>, error_code: Option<String>) -> Self {
        let message = message.into();
        match status {
            400 => Self::BadRequest {
                message,
                error_code,
            },
            401 => Self::Unauthorized {
                message,
                error_code,
            },
            403 => Self::Forbidden {
                message,
                error_code,
            },
            404 => Self::NotFound {
                message,
                error_code,
            },
            409 => Self::Conflict {
                message,
                error_code,
            },
            _ => Self::Api {
                status,
                message,
                error_code,
            },
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid input error for values rejected before any request is sent
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid response error when the server payload has the wrong shape
    pub fn invalid_response(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status code carried by this error, if it came from a server response
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-provided error code (e.g. `not_found_error`), if any
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::NotFound { error_code, .. }
            | Self::Conflict { error_code, .. }
            | Self::Unauthorized { error_code, .. }
            | Self::Forbidden { error_code, .. }
            | Self::BadRequest { error_code, .. }
            | Self::Api { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if error is recoverable (worth retrying by the caller)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
