//! Mock HTTP generation backend
//!
//! Answers every request with a fixed status and body and keeps the
//! decoded request bodies for inspection.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    status: StatusCode,
    body: String,
    received: Mutex<Vec<serde_json::Value>>,
}

impl MockBackend {
    /// Start a backend answering `200` with `body`
    pub async fn start(body: impl Into<String>) -> anyhow::Result<Self> {
        Self::start_with_status(StatusCode::OK, body).await
    }

    pub async fn start_with_status(status: StatusCode, body: impl Into<String>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            status,
            body: body.into(),
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/generate", routing::post(handle_generate))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn url(&self) -> String {
        format!("http://{}/generate", self.addr)
    }

    /// Request bodies received so far
    pub fn received(&self) -> Vec<serde_json::Value> {
        self.state.received.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_generate(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, String) {
    state.received.lock().unwrap().push(body);
    (state.status, state.body.clone())
}
