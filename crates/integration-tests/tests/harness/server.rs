//! Test server wrapper that starts podrelay on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use podrelay_config::Config;
use podrelay_generation::{GenerationService, Generator};
use podrelay_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a server whose generator comes from `config`
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        Self::spawn(Server::new(&config)?).await
    }

    /// Start a server backed by an in-process generation service
    pub async fn start_with_service(config: Config, service: Arc<dyn GenerationService>) -> anyhow::Result<Self> {
        let generator = Arc::new(Generator::new(service));
        Self::spawn(Server::with_generator(&config, generator)?).await
    }

    async fn spawn(server: Server) -> anyhow::Result<Self> {
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind here so the actual port is known
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
        })
    }

    /// URL of `path` on the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Submit the podcast form
    pub async fn submit(&self, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url("/"))
            .form(fields)
            .send()
            .await
            .expect("form submission")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
