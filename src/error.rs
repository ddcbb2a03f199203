//! Unified client error handling
//!
//! Every collaborator call resolves to `ClientResult`. The widget never
//! surfaces these to the host; it logs them and carries on.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Error body returned by the notification service on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl ClientError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Service { .. } => "SERVICE_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Url(_) => "INVALID_URL",
        }
    }

    /// Build the error for a non-2xx status, preferring the service's own message.
    pub fn from_status(status: reqwest::StatusCode, body: Option<ErrorResponse>) -> Self {
        let message = body
            .map(|b| b.message)
            .unwrap_or_else(|| format!("Notification service error: {}", status));

        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Service {
                status: status.as_u16(),
                message,
            },
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
