use http::StatusCode;
use serde::Serialize;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The server layer turns
/// these into responses, so the generation and materializer crates stay
/// free of axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error kind, used for logging (e.g. `upstream_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to callers
    fn client_message(&self) -> String;
}

/// Uniform failure record returned to HTTP callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn from_error<E: HttpError + ?Sized>(err: &E) -> Self {
        Self {
            error: err.client_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom: /var/secret/path")
        }
    }

    impl std::error::Error for Boom {}

    impl HttpError for Boom {
        fn status_code(&self) -> StatusCode {
            StatusCode::INTERNAL_SERVER_ERROR
        }

        fn error_type(&self) -> &str {
            "internal_error"
        }

        fn client_message(&self) -> String {
            "Internal server error".to_string()
        }
    }

    #[test]
    fn body_uses_client_message() {
        let body = ErrorBody::from_error(&Boom);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Internal server error" }));
    }
}
