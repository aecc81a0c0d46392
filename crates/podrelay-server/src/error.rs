use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use podrelay_core::{ErrorBody, HttpError};
use podrelay_generation::GenerationError;
use podrelay_materializer::MaterializationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PodcastError>;

/// Everything that can fail while serving a podcast request
#[derive(Debug, Error)]
pub enum PodcastError {
    /// Malformed or missing form input
    #[error("{0}")]
    Input(String),

    #[error("unsupported content type, expected application/x-www-form-urlencoded")]
    UnsupportedMediaType,

    #[error("request body is too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Materialization(#[from] MaterializationError),
}

impl HttpError for PodcastError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Input(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Generation(e) => e.status_code(),
            Self::Materialization(e) => e.status_code(),
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Input(_) | Self::UnsupportedMediaType | Self::PayloadTooLarge(_) => "input_error",
            Self::Generation(e) => e.error_type(),
            Self::Materialization(e) => e.error_type(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Generation(e) => e.client_message(),
            Self::Materialization(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for PodcastError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error_type = self.error_type(), error = %self, "podcast request failed");
        } else {
            tracing::debug!(error_type = self.error_type(), error = %self, "podcast request rejected");
        }

        (status, Json(ErrorBody::from_error(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn upstream_message_reaches_client() {
        let err = PodcastError::from(MaterializationError::Upstream("no content found".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.client_message(), "no content found");
    }

    #[test]
    fn io_detail_stays_internal() {
        let err = PodcastError::from(MaterializationError::Io {
            context: "failed to publish /tmp/audio/podcast_x.mp3".to_string(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn missing_audio_hides_path() {
        let err = PodcastError::from(MaterializationError::MissingAudio(PathBuf::from("/secret/out.mp3")));
        assert!(!err.client_message().contains("/secret"));
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        let err = PodcastError::from(GenerationError::Timeout(std::time::Duration::from_secs(600)));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn input_errors_are_bad_requests() {
        let err = PodcastError::Input("word_count must be a whole number".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "word_count must be a whole number");
        assert_eq!(PodcastError::UnsupportedMediaType.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
