use std::fs;
use std::io;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{filename::is_artifact_name, materializer::STAGING_PREFIX, Materializer};

/// Outcome of one retention pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

impl Materializer {
    /// Delete artifacts and abandoned staging files older than `max_age`
    ///
    /// Age is measured from the last modification relative to `now`. Files
    /// that are neither artifacts nor staging files are left alone.
    pub fn sweep(&self, max_age: Duration, now: SystemTime) -> io::Result<SweepReport> {
        let mut report = SweepReport::default();

        for entry in fs::read_dir(self.audio_dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };

            if !is_artifact_name(name, self.extension()) && !name.starts_with(STAGING_PREFIX) {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();

            if age < max_age {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    tracing::debug!(file = name, age_secs = age.as_secs(), "removed expired audio");
                    report.removed += 1;
                }
                // raced with another sweeper or a manual cleanup
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(file = name, "failed to remove expired audio: {e}");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Shortest period the sweeper runs at
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically sweep `materializer`'s directory until `shutdown` fires
///
/// An `interval` below one second is raised to one second.
pub fn spawn_retention_sweeper(
    materializer: Arc<Materializer>,
    max_age: Duration,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            dir = %materializer.audio_dir().display(),
            max_age_secs = max_age.as_secs(),
            interval_secs = interval.as_secs(),
            "audio retention sweeper started"
        );

        let mut ticker = tokio::time::interval(interval.max(MIN_SWEEP_INTERVAL));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let materializer = Arc::clone(&materializer);
            let outcome = tokio::task::spawn_blocking(move || materializer.sweep(max_age, SystemTime::now())).await;

            match outcome {
                Ok(Ok(report)) if report.removed > 0 || report.failed > 0 => {
                    tracing::info!(removed = report.removed, failed = report.failed, "audio retention sweep finished");
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::warn!("audio retention sweep failed: {e}"),
                Err(e) => tracing::error!("audio retention sweep panicked: {e}"),
            }
        }

        tracing::debug!("audio retention sweeper stopped");
    })
}
