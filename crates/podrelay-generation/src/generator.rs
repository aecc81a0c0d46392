use std::sync::Arc;
use std::time::{Duration, Instant};

use podrelay_config::{Config, GeneratorBackend};

use crate::{
    error::{GenerationError, Result},
    provider::{GenerationService, command::CommandService, http::HttpService},
    result::RawGenerationResult,
    types::{Credentials, GenerationRequest},
};

/// Default bound on a single generation call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Front door to the configured generation service
///
/// Adds configured default credentials under the request's own and bounds
/// every call with a timeout.
pub struct Generator {
    service: Arc<dyn GenerationService>,
    timeout: Duration,
    default_credentials: Credentials,
}

impl Generator {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            service,
            timeout: DEFAULT_TIMEOUT,
            default_credentials: Credentials::default(),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_default_credentials(mut self, credentials: Credentials) -> Self {
        self.default_credentials = credentials;
        self
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one generation call
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Timeout`] if the service does not answer in
    /// time, or whatever error the service itself raises
    pub async fn generate(&self, mut request: GenerationRequest) -> Result<RawGenerationResult> {
        request.credentials.merge_defaults(&self.default_credentials);

        tracing::info!(
            service = self.service.name(),
            source = request.source.kind(),
            tts_model = %request.tts_model,
            providers = ?request.credentials.providers(),
            "starting podcast generation"
        );

        if !request.tts_model.is_supported() {
            tracing::warn!(tts_model = %request.tts_model, "passing unrecognized tts model to generation service");
        }

        let started = Instant::now();

        let Ok(result) = tokio::time::timeout(self.timeout, self.service.generate(request)).await else {
            tracing::warn!(
                service = self.service.name(),
                timeout_secs = self.timeout.as_secs(),
                "podcast generation timed out"
            );
            return Err(GenerationError::Timeout(self.timeout));
        };

        match &result {
            Ok(raw) => tracing::info!(
                service = self.service.name(),
                shape = raw.shape(),
                elapsed_ms = started.elapsed().as_millis(),
                "podcast generation finished"
            ),
            Err(GenerationError::UnrecognizedShape(payload)) => tracing::error!(
                service = self.service.name(),
                %payload,
                "generation service broke its result contract"
            ),
            Err(e) => tracing::warn!(service = self.service.name(), error = %e, "podcast generation failed"),
        }

        result
    }
}

/// Builds a [`Generator`] from configuration
pub struct GeneratorBuilder<'a> {
    config: &'a Config,
}

impl<'a> GeneratorBuilder<'a> {
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// # Errors
    ///
    /// Returns [`GenerationError::Config`] if no generator is configured or
    /// its settings are invalid
    pub fn build(self) -> Result<Generator> {
        let generator_config = self
            .config
            .generator
            .as_ref()
            .ok_or_else(|| GenerationError::Config("no generator configured".to_string()))?;

        let timeout = generator_config
            .timeout_duration()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        let backend = generator_config
            .backend()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        let service: Arc<dyn GenerationService> = match backend {
            GeneratorBackend::Command(command) => {
                tracing::debug!(program = %command.program, "using command generation backend");
                Arc::new(CommandService::new("command", command))
            }
            GeneratorBackend::Http(http) => {
                tracing::debug!(url = %http.url, "using HTTP generation backend");
                Arc::new(HttpService::new("http", http)?)
            }
        };

        let defaults = Credentials::from_entries(&self.config.credentials);
        if !defaults.is_empty() {
            tracing::debug!(providers = ?defaults.providers(), "loaded default provider credentials");
        }

        Ok(Generator::new(service)
            .with_timeout(timeout)
            .with_default_credentials(defaults))
    }
}
