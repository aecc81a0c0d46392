#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod form;
mod podcast;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use podrelay_config::Config;
use podrelay_generation::Generator;
use podrelay_materializer::Materializer;
use tower_http::trace::TraceLayer;

pub use error::{PodcastError, Result};
pub use form::{Mode, PodcastForm};
pub use podcast::PodcastResponse;

use podcast::PodcastState;

/// Retention settings for the background sweeper
#[derive(Debug, Clone, Copy)]
struct Retention {
    max_age: Duration,
    interval: Duration,
}

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    materializer: Arc<Materializer>,
    retention: Option<Retention>,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the generation service or audio directory cannot
    /// be set up
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let generator = podrelay_generation::build_generator(config)?;
        Self::with_generator(config, generator)
    }

    /// Build the server around an already constructed generator
    ///
    /// # Errors
    ///
    /// Returns an error if the audio directory cannot be created or storage
    /// durations are invalid
    pub fn with_generator(config: &Config, generator: Arc<Generator>) -> anyhow::Result<Self> {
        let storage = &config.storage;

        let materializer = Arc::new(
            Materializer::from_config(storage)
                .map_err(|e| anyhow::anyhow!("Failed to prepare audio directory: {e}"))?,
        );

        if let Err(e) = std::fs::create_dir_all(&storage.temp_dir) {
            tracing::warn!(dir = %storage.temp_dir.display(), "could not create generation scratch directory: {e}");
        }

        let retention = storage
            .retention_duration()?
            .map(|max_age| -> anyhow::Result<Retention> {
                Ok(Retention {
                    max_age,
                    interval: storage.sweep_interval_duration()?,
                })
            })
            .transpose()?;

        let state = Arc::new(PodcastState {
            generator,
            materializer: Arc::clone(&materializer),
            temp_dir: storage.temp_dir.clone(),
        });

        let mut app = Router::new()
            .route("/", get(podcast::index).post(podcast::submit))
            .route(&format!("{}/{{filename}}", storage.route_prefix()), get(podcast::audio))
            .with_state(state);

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, get(health));
        }

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address: config.server.listen_address(),
            materializer,
            retention,
        })
    }

    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    #[must_use]
    pub const fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    pub fn materializer(&self) -> &Arc<Materializer> {
        &self.materializer
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener. The
    /// retention sweeper is not started.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. Starts the
    /// retention sweeper when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        let sweeper = self.retention.map(|retention| {
            podrelay_materializer::spawn_retention_sweeper(
                Arc::clone(&self.materializer),
                retention.max_age,
                retention.interval,
                shutdown.child_token(),
            )
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        if let Some(sweeper) = sweeper
            && let Err(e) = sweeper.await
        {
            tracing::warn!("retention sweeper ended abnormally: {e}");
        }

        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}
