use std::path::Path;

use crate::{Config, GeneratorBackend};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Expands `{{ env.VAR }}` placeholders before parsing, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, expansion or parsing
    /// fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the generator is missing or misconfigured, or
    /// server or storage settings are invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_generator()?;
        self.validate_storage()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        let health = &self.server.health;
        if !health.enabled {
            return Ok(());
        }

        let path = health.path.as_str();
        if !path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/', got '{path}'");
        }

        if path.trim_end_matches('/').is_empty() {
            anyhow::bail!("server.health.path must not be the site root");
        }

        if path.contains(['{', '}', '*']) {
            anyhow::bail!("server.health.path must be a literal path, got '{path}'");
        }

        let audio = self.storage.route_prefix();
        let health_route = path.trim_end_matches('/');
        if health_route == audio || health_route.starts_with(&format!("{audio}/")) {
            anyhow::bail!("server.health.path '{path}' overlaps the audio route '{audio}'");
        }

        Ok(())
    }

    fn validate_generator(&self) -> anyhow::Result<()> {
        let Some(ref generator) = self.generator else {
            anyhow::bail!("a [generator] section is required");
        };

        generator.timeout_duration()?;

        if let GeneratorBackend::Command(command) = generator.backend()?
            && command.program.trim().is_empty()
        {
            anyhow::bail!("generator.command.program must not be empty");
        }

        Ok(())
    }

    fn validate_storage(&self) -> anyhow::Result<()> {
        let storage = &self.storage;

        if !storage.public_prefix.starts_with('/') {
            anyhow::bail!("storage.public_prefix must start with '/'");
        }

        if storage.route_prefix().is_empty() {
            anyhow::bail!("storage.public_prefix must not be the site root");
        }

        if storage.extension.is_empty() || !storage.extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("storage.extension must be a non-empty alphanumeric extension");
        }

        storage.retention_duration()?;
        storage.sweep_interval_duration()?;

        Ok(())
    }
}
