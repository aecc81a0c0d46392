pub mod command;
pub mod http;

use async_trait::async_trait;

use crate::{result::RawGenerationResult, types::GenerationRequest};

/// A binding to an external podcast generation service
///
/// Implementations perform the whole scrape, script and synthesize pipeline
/// (or delegate it) and report one of the [`RawGenerationResult`] shapes.
/// Credentials arrive on the request and must stay scoped to this call.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Run one generation call
    async fn generate(&self, request: GenerationRequest) -> crate::error::Result<RawGenerationResult>;

    /// Binding name, for logs
    fn name(&self) -> &str;
}
