use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use podrelay_config::StorageConfig;
use podrelay_generation::RawGenerationResult;
use serde::Serialize;

use crate::{
    error::{MaterializationError, Result},
    filename::{generate_filename, is_artifact_name},
};

/// Name prefix of in-flight copies inside the audio directory
pub(crate) const STAGING_PREFIX: &str = ".podcast-staging-";

/// Fresh names drawn before giving up when publishing keeps colliding
const MAX_NAME_ATTEMPTS: usize = 4;

/// A generated podcast published to the audio directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializedArtifact {
    pub filename: String,
    pub servable_path: PathBuf,
    pub public_url: String,
    pub details: String,
}

/// Publishes generation results into one servable directory
#[derive(Debug, Clone)]
pub struct Materializer {
    audio_dir: PathBuf,
    public_prefix: String,
    extension: String,
}

impl Materializer {
    /// Bind to `audio_dir`, creating it (mode `0755` on unix) if needed
    ///
    /// `public_prefix` is the URL path files are served under (e.g. `/audio`).
    pub fn new(audio_dir: impl Into<PathBuf>, public_prefix: &str, extension: &str) -> Result<Self> {
        let audio_dir = audio_dir.into();

        fs::create_dir_all(&audio_dir).map_err(MaterializationError::io(format!(
            "failed to create audio directory {}",
            audio_dir.display()
        )))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;

            if let Err(e) = fs::set_permissions(&audio_dir, fs::Permissions::from_mode(0o755)) {
                tracing::warn!(dir = %audio_dir.display(), "could not set audio directory permissions: {e}");
            }
        }

        Ok(Self {
            audio_dir,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            extension: extension.to_string(),
        })
    }

    pub fn from_config(storage: &StorageConfig) -> Result<Self> {
        Self::new(&storage.audio_dir, &storage.public_prefix, &storage.extension)
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of a previously materialized file, if `filename` names one
    ///
    /// Only names shaped like generated artifacts are resolved, so staging
    /// files and anything outside the directory stay unreachable.
    pub async fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if !is_artifact_name(filename, &self.extension) {
            return None;
        }

        let path = self.audio_dir.join(filename);
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        metadata.is_file().then_some(path)
    }

    /// Classify `raw` and publish its audio
    ///
    /// - [`RawGenerationResult::FilePath`] naming an existing regular file is
    ///   copied; any other path is treated as an error message verbatim
    /// - [`RawGenerationResult::Object`] has its `audio_path` copied and keeps
    ///   its `details`, falling back to `fallback_details` when blank
    /// - [`RawGenerationResult::Failure`] becomes
    ///   [`MaterializationError::Upstream`] without touching the directory
    ///
    /// The source file is copied, never moved.
    pub fn materialize(&self, raw: RawGenerationResult, fallback_details: &str) -> Result<MaterializedArtifact> {
        let (source, details) = match raw {
            RawGenerationResult::FilePath(path) if path.is_file() => (path, None),
            RawGenerationResult::FilePath(path) => {
                return Err(MaterializationError::Upstream(path.to_string_lossy().into_owned()));
            }
            RawGenerationResult::Object { audio_path, details } => {
                if !audio_path.is_file() {
                    return Err(MaterializationError::MissingAudio(audio_path));
                }
                (audio_path, details)
            }
            RawGenerationResult::Failure(message) => return Err(MaterializationError::Upstream(message)),
        };

        let mut input = File::open(&source).map_err(MaterializationError::io(format!(
            "failed to open generated audio {}",
            source.display()
        )))?;

        let (filename, servable_path) = self.publish(&mut input)?;

        let details = details
            .filter(|details| !details.trim().is_empty())
            .unwrap_or_else(|| fallback_details.to_string());

        tracing::info!(
            source = %source.display(),
            destination = %servable_path.display(),
            "materialized podcast audio"
        );

        Ok(MaterializedArtifact {
            public_url: format!("{}/{filename}", self.public_prefix),
            filename,
            servable_path,
            details,
        })
    }

    /// Run [`Self::materialize`] on the blocking thread pool
    pub async fn materialize_async(
        self: Arc<Self>,
        raw: RawGenerationResult,
        fallback_details: String,
    ) -> Result<MaterializedArtifact> {
        tokio::task::spawn_blocking(move || self.materialize(raw, &fallback_details))
            .await
            .map_err(|e| MaterializationError::Io {
                context: "materialization task failed".to_string(),
                source: io::Error::other(e),
            })?
    }

    /// Copy `reader` into a staging file, then move it under a fresh name
    ///
    /// The staging file is flushed to disk before it becomes visible under
    /// its final name and is removed if anything fails on the way.
    fn publish<R: Read>(&self, reader: &mut R) -> Result<(String, PathBuf)> {
        let mut staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".part")
            .tempfile_in(&self.audio_dir)
            .map_err(MaterializationError::io("failed to create staging file"))?;

        io::copy(reader, staged.as_file_mut()).map_err(MaterializationError::io("failed to copy generated audio"))?;

        staged
            .as_file()
            .sync_all()
            .map_err(MaterializationError::io("failed to flush staged audio"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;

            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(MaterializationError::io("failed to set audio permissions"))?;
        }

        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = generate_filename(&self.extension);
            let destination = self.audio_dir.join(&filename);

            match staged.persist_noclobber(&destination) {
                Ok(_) => return Ok((filename, destination)),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::warn!(%filename, "generated filename already taken, drawing another");
                    staged = err.file;
                }
                Err(err) => {
                    return Err(MaterializationError::Io {
                        context: format!("failed to publish {}", destination.display()),
                        source: err.error,
                    });
                }
            }
        }

        Err(MaterializationError::Io {
            context: "no free filename found".to_string(),
            source: io::Error::from(io::ErrorKind::AlreadyExists),
        })
    }
}
