#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Binding to the external podcast generation service
//!
//! Requests are typed ([`GenerationRequest`]), results come back as one of
//! three [`RawGenerationResult`] shapes, and every call goes through a
//! [`Generator`] that scopes credentials and enforces a timeout.

mod error;
mod generator;
mod provider;
mod result;
mod types;

use std::sync::Arc;

pub use error::{GenerationError, Result};
pub use generator::{DEFAULT_TIMEOUT, Generator, GeneratorBuilder};
pub use provider::{GenerationService, command::CommandService, http::HttpService};
pub use result::RawGenerationResult;
pub use types::{ConversationConfig, Credentials, GenerationRequest, Source, TextToSpeechOptions, TtsModel};

/// Build the generator from configuration
pub fn build_generator(config: &podrelay_config::Config) -> anyhow::Result<Arc<Generator>> {
    let generator = GeneratorBuilder::new(config)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to initialize generation service: {e}"))?;
    Ok(Arc::new(generator))
}
