#![allow(clippy::must_use_candidate)]

mod env;
pub mod generator;
pub mod health;
mod loader;
pub mod server;
pub mod storage;
pub mod telemetry;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;

pub use generator::*;
pub use health::*;
pub use server::*;
pub use storage::*;
pub use telemetry::*;

/// Top-level podrelay configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Where materialized audio lives and how it is addressed
    #[serde(default)]
    pub storage: StorageConfig,
    /// External generation service binding
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
    /// Default provider credentials keyed by provider name (e.g. `gemini`)
    ///
    /// Request-supplied keys take precedence over these.
    #[serde(default)]
    pub credentials: IndexMap<String, SecretString>,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Parse a human-readable duration such as `10m` or `24h`
///
/// Every configured duration is a period or a bound, so zero is rejected.
pub(crate) fn parse_duration(field: &str, value: &str) -> anyhow::Result<std::time::Duration> {
    let duration =
        duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{value}': {e}"))?;

    if duration.is_zero() {
        anyhow::bail!("{field} must be greater than zero, got '{value}'");
    }

    Ok(duration)
}
