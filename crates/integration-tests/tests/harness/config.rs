//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use podrelay_config::{
    CommandGeneratorConfig, Config, GeneratorConfig, HealthConfig, HttpGeneratorConfig, ServerConfig, StorageConfig,
};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal config storing audio under `root`
    pub fn new(root: &Path) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                storage: StorageConfig {
                    audio_dir: root.join("audio"),
                    temp_dir: root.join("tmp"),
                    ..StorageConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Post generation requests to a backend at `url`
    pub fn with_http_generator(mut self, url: &str) -> Self {
        self.config.generator = Some(GeneratorConfig {
            timeout: "30s".to_owned(),
            command: None,
            http: Some(HttpGeneratorConfig {
                url: url.parse().expect("valid URL"),
                api_key: None,
            }),
        });
        self
    }

    /// Run `sh -c <script>` per generation request
    pub fn with_shell_generator(mut self, script: &str) -> Self {
        self.config.generator = Some(GeneratorConfig {
            timeout: "30s".to_owned(),
            command: Some(CommandGeneratorConfig {
                program: "sh".to_owned(),
                args: vec!["-c".to_owned(), script.to_owned()],
                env: Default::default(),
                working_dir: None,
            }),
            http: None,
        });
        self
    }

    /// Configure a default provider key
    pub fn with_credential(mut self, provider: &str, key: &str) -> Self {
        self.config
            .credentials
            .insert(provider.to_owned(), SecretString::from(key.to_owned()));
        self
    }

    /// Serve audio under a different prefix
    pub fn with_public_prefix(mut self, prefix: &str) -> Self {
        self.config.storage.public_prefix = prefix.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
