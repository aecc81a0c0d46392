use std::path::PathBuf;

use http::StatusCode;
use podrelay_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaterializationError>;

/// Why a generation result could not be turned into a servable file
#[derive(Debug, Error)]
pub enum MaterializationError {
    /// The generation service reported failure; carries its message verbatim
    #[error("{0}")]
    Upstream(String),

    /// The service claimed success but the audio file it named is missing
    #[error("generated audio file not found: {}", .0.display())]
    MissingAudio(PathBuf),

    /// Local filesystem failure while staging or publishing the file
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl MaterializationError {
    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}

impl HttpError for MaterializationError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream(_) | Self::MissingAudio(_) => StatusCode::BAD_GATEWAY,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Upstream(_) | Self::MissingAudio(_) => "upstream_error",
            Self::Io { .. } => "io_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Upstream(message) => message.clone(),
            Self::MissingAudio(_) => "Generation service did not produce an audio file".to_string(),
            Self::Io { .. } => "Internal server error".to_string(),
        }
    }
}
