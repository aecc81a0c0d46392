//! Logging for podrelay
//!
//! Installs a `tracing-subscriber` registry writing text or JSON lines.

use podrelay_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the event filter
///
/// `RUST_LOG` wins over the configured directive. An invalid configured
/// directive is an error rather than a silent fallback.
///
/// # Errors
///
/// Returns an error if the configured filter directive does not parse
pub fn filter(config: &TelemetryConfig) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.log_filter)
        .map_err(|e| anyhow::anyhow!("invalid telemetry.log_filter '{}': {e}", config.log_filter))
}

/// Initialize logging to stdout from configuration
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_with_writer(config, std::io::stdout)
}

/// Initialize logging to `writer`
///
/// The command-line generator logs to stderr so stdout carries only its
/// result.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed
pub fn init_with_writer<W>(config: &TelemetryConfig, writer: W) -> anyhow::Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = filter(config)?;

    let result = match config.format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true);

            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
        }
    };

    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
