use std::time::Duration;

use http::StatusCode;
use podrelay_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors raised while building or running a generation call
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request is missing required parameters or carries malformed ones
    #[error("{0}")]
    InvalidRequest(String),

    /// The generation backend answered with a non-success status
    #[error("generation backend error ({status}): {message}")]
    ProviderApi { status: u16, message: String },

    /// The generation backend could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    /// The call did not finish within the configured timeout
    #[error("podcast generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The backend returned something that is none of the known result shapes
    #[error("unrecognized generation result: {0}")]
    UnrecognizedShape(String),

    /// Local I/O failure around the call (spawning, pipes)
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The generation binding is misconfigured
    #[error("configuration error: {0}")]
    Config(String),
}

impl HttpError for GenerationError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::ProviderApi { .. } | Self::Connection(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::UnrecognizedShape(_) | Self::Io { .. } | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "input_error",
            Self::ProviderApi { .. } | Self::Connection(_) => "upstream_error",
            Self::Timeout(_) => "timeout_error",
            Self::UnrecognizedShape(_) => "unrecognized_result",
            Self::Io { .. } | Self::Config(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::ProviderApi { message, .. } => message.clone(),
            Self::UnrecognizedShape(_) => "Generation service returned an unrecognized result".to_string(),
            Self::Io { .. } | Self::Config(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}
