use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Path, Request, State},
    response::{Html, IntoResponse, Response},
};
use http::StatusCode;
use podrelay_core::ErrorBody;
use podrelay_generation::Generator;
use podrelay_materializer::Materializer;
use serde::Serialize;
use tower::ServiceExt as _;
use tower_http::services::ServeFile;

use crate::{
    error::Result,
    form::ExtractForm,
};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared state for the podcast routes
pub struct PodcastState {
    pub generator: Arc<Generator>,
    pub materializer: Arc<Materializer>,
    /// Scratch directory offered to the generation service
    pub temp_dir: PathBuf,
}

/// Successful submission
#[derive(Debug, Serialize)]
pub struct PodcastResponse {
    pub audio_url: String,
    pub details: String,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Generate a podcast from a form submission and publish its audio
pub async fn submit(
    State(state): State<Arc<PodcastState>>,
    ExtractForm(form): ExtractForm,
) -> Result<Json<PodcastResponse>> {
    let mode = form.mode();
    let request = form.to_request(&state.temp_dir)?;

    let raw = state.generator.generate(request).await?;

    let artifact = Arc::clone(&state.materializer)
        .materialize_async(raw, mode.default_details().to_string())
        .await?;

    tracing::info!(filename = %artifact.filename, ?mode, "podcast ready");

    Ok(Json(PodcastResponse {
        audio_url: artifact.public_url,
        details: artifact.details,
    }))
}

/// Serve a materialized audio file by name
pub async fn audio(
    State(state): State<Arc<PodcastState>>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    let Some(path) = state.materializer.resolve(&filename).await else {
        tracing::debug!(%filename, "audio file not found");
        let body = ErrorBody {
            error: "Audio file not found".to_string(),
        };
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    };

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}
