use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// External generation service binding
///
/// Exactly one of `command` or `http` must be set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Upper bound on a single generation call (e.g. `10m`)
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Run a local program per request
    #[serde(default)]
    pub command: Option<CommandGeneratorConfig>,
    /// Post requests to a remote generation backend
    #[serde(default)]
    pub http: Option<HttpGeneratorConfig>,
}

impl GeneratorConfig {
    /// Parsed call timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout string is not a valid duration
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        crate::parse_duration("generator.timeout", &self.timeout)
    }

    /// The configured backend
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one backend is configured
    pub fn backend(&self) -> anyhow::Result<GeneratorBackend<'_>> {
        match (&self.command, &self.http) {
            (Some(command), None) => Ok(GeneratorBackend::Command(command)),
            (None, Some(http)) => Ok(GeneratorBackend::Http(http)),
            (Some(_), Some(_)) => anyhow::bail!("generator must configure either `command` or `http`, not both"),
            (None, None) => anyhow::bail!("generator must configure a `command` or `http` backend"),
        }
    }
}

/// Borrowed view of the selected backend
#[derive(Debug, Clone, Copy)]
pub enum GeneratorBackend<'a> {
    Command(&'a CommandGeneratorConfig),
    Http(&'a HttpGeneratorConfig),
}

/// Program invoked once per generation request
///
/// The request is written to the program's stdin as JSON and the result is
/// read from its stdout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandGeneratorConfig {
    /// Executable to run
    pub program: String,
    /// Arguments passed before any request data
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment for the child process
    #[serde(default)]
    pub env: IndexMap<String, String>,
    /// Working directory for the child process
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Remote generation backend
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpGeneratorConfig {
    /// Endpoint receiving generation requests
    pub url: Url,
    /// Bearer token for the backend itself
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

fn default_timeout() -> String {
    "10m".to_string()
}
