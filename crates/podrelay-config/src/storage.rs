use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Filesystem locations for generated audio
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory materialized audio is copied into and served from
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    /// Scratch directory handed to the generation service for intermediate audio
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// URL path prefix materialized files are served under
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// File extension given to materialized audio
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Maximum age of materialized audio before it is swept (e.g. `24h`)
    ///
    /// Files are kept forever when unset.
    #[serde(default)]
    pub retention: Option<String>,
    /// How often the retention sweep runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            temp_dir: default_temp_dir(),
            public_prefix: default_public_prefix(),
            extension: default_extension(),
            retention: None,
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl StorageConfig {
    /// Parsed retention period, if one is configured
    ///
    /// # Errors
    ///
    /// Returns an error if the retention string is not a valid duration
    pub fn retention_duration(&self) -> anyhow::Result<Option<Duration>> {
        self.retention
            .as_deref()
            .map(|value| crate::parse_duration("storage.retention", value))
            .transpose()
    }

    /// Parsed sweep interval
    ///
    /// # Errors
    ///
    /// Returns an error if the interval string is not a valid duration
    pub fn sweep_interval_duration(&self) -> anyhow::Result<Duration> {
        crate::parse_duration("storage.sweep_interval", &self.sweep_interval)
    }

    /// Public prefix without a trailing slash (e.g. `/audio`)
    pub fn route_prefix(&self) -> &str {
        self.public_prefix.trim_end_matches('/')
    }
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("/tmp/audio")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("./data/audio/tmp")
}

fn default_public_prefix() -> String {
    "/audio".to_string()
}

fn default_extension() -> String {
    "mp3".to_string()
}

fn default_sweep_interval() -> String {
    "10m".to_string()
}
