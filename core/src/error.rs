//! Error types and HTTP status mapping

use serde::Serialize;
use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Adapter error with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    /// The remote endpoint could not be reached or its body could not be read
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The remote endpoint answered with something that is not a JWKS document
    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Transport { .. } => 502,
            Self::Parse { .. } => 502,
            Self::Config { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }

    /// Get the error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport_error",
            Self::Parse { .. } => "parse_error",
            Self::Config { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.error_key().to_string(),
            message: err.to_string(),
        }
    }
}
