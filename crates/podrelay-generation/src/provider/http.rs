use std::time::Duration;

use async_trait::async_trait;
use podrelay_config::HttpGeneratorConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{
    error::{GenerationError, Result},
    result::RawGenerationResult,
    types::{GenerationRequest, WireRequest},
};

use super::GenerationService;

/// Largest backend response body read into memory (1 MiB)
const MAX_RESPONSE_BYTES: usize = 1 << 20;

/// Posts generation requests to a remote backend
///
/// Provider keys travel in the body's `api_keys` object. Returned paths must
/// be readable from this host (e.g. a shared volume).
pub struct HttpService {
    client: Client,
    url: Url,
    api_key: Option<SecretString>,
    name: String,
}

impl HttpService {
    /// # Errors
    ///
    /// Returns [`GenerationError::Config`] if the HTTP client cannot be built
    pub fn new(name: impl Into<String>, config: &HttpGeneratorConfig) -> Result<Self> {
        // No overall timeout here: the generator enforces one per call
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()
            .map_err(|e| GenerationError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            name: name.into(),
        })
    }
}

#[async_trait]
impl GenerationService for HttpService {
    async fn generate(&self, request: GenerationRequest) -> Result<RawGenerationResult> {
        tracing::debug!(url = %self.url, source = request.source.kind(), "posting generation request");

        let mut builder = self.client.post(self.url.clone()).json(&WireRequest::new(&request, true));

        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("generation backend request failed: {e}");
            GenerationError::Connection(format!("failed to reach generation backend: {e}"))
        })?;

        let status = response.status();
        let (body, truncated) = read_capped(response).await?;

        if !status.is_success() {
            tracing::error!("generation backend error ({status}): {body}");

            return Err(GenerationError::ProviderApi {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        if truncated {
            return Err(GenerationError::Connection(format!(
                "generation backend response exceeded {MAX_RESPONSE_BYTES} bytes"
            )));
        }

        RawGenerationResult::decode(&body)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Read at most [`MAX_RESPONSE_BYTES`] of a response body
///
/// Returns the text read and whether the body was cut short.
async fn read_capped(mut response: reqwest::Response) -> Result<(String, bool)> {
    let mut body = Vec::new();

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| GenerationError::Connection(format!("failed to read generation backend response: {e}")))?
    {
        let room = MAX_RESPONSE_BYTES - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            return Ok((String::from_utf8_lossy(&body).into_owned(), true));
        }
        body.extend_from_slice(&chunk);
    }

    Ok((String::from_utf8_lossy(&body).into_owned(), false))
}

/// Message for a non-2xx reply: the `error` of a `{"error": ...}` body,
/// otherwise the whole body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(serde_json::Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
