//! In-process generation service with scripted replies

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use podrelay_generation::{GenerationRequest, GenerationService, RawGenerationResult, Result};
use tempfile::TempDir;

/// What the stub answers with
pub enum Reply {
    /// Write these bytes to a file and return its path
    Audio(Vec<u8>),
    /// Write these bytes and return a result object with details
    AudioWithDetails(Vec<u8>, String),
    /// Report failure with this message
    Failure(String),
}

/// Generation service that never leaves the process
pub struct StubGenerator {
    reply: Reply,
    scratch: TempDir,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            scratch: tempfile::tempdir().expect("scratch dir"),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Path the stub writes generated audio to
    pub fn output_path(&self) -> PathBuf {
        self.scratch.path().join("generated.mp3")
    }

    fn write_audio(&self, bytes: &[u8]) -> PathBuf {
        let path = self.output_path();
        std::fs::write(&path, bytes).expect("write stub audio");
        path
    }
}

#[async_trait]
impl GenerationService for StubGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<RawGenerationResult> {
        self.requests.lock().unwrap().push(request);

        Ok(match &self.reply {
            Reply::Audio(bytes) => RawGenerationResult::FilePath(self.write_audio(bytes)),
            Reply::AudioWithDetails(bytes, details) => RawGenerationResult::Object {
                audio_path: self.write_audio(bytes),
                details: Some(details.clone()),
            },
            Reply::Failure(message) => RawGenerationResult::Failure(message.clone()),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}
