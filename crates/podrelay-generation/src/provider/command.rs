use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use indexmap::IndexMap;
use podrelay_config::CommandGeneratorConfig;
use secrecy::ExposeSecret;
use tokio::io::AsyncWriteExt as _;
use tokio::process::Command;

use crate::{
    error::{GenerationError, Result},
    result::RawGenerationResult,
    types::{GenerationRequest, WireRequest},
};

use super::GenerationService;

/// Runs a generator program once per request
///
/// The request goes to the child's stdin as JSON and stdout is decoded with
/// [`RawGenerationResult::decode`]. Provider keys are set on the child's
/// environment only (`GEMINI_API_KEY`, ...), never on this process.
pub struct CommandService {
    name: String,
    program: String,
    args: Vec<String>,
    env: IndexMap<String, String>,
    working_dir: Option<PathBuf>,
}

impl CommandService {
    pub fn new(name: impl Into<String>, config: &CommandGeneratorConfig) -> Self {
        Self {
            name: name.into(),
            program: config.program.clone(),
            args: config.args.clone(),
            env: config.env.clone(),
            working_dir: config.working_dir.clone(),
        }
    }

    fn command(&self, request: &GenerationRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        for (var, key) in request.credentials.env_vars() {
            cmd.env(var, key.expose_secret());
        }

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        cmd
    }
}

#[async_trait]
impl GenerationService for CommandService {
    async fn generate(&self, request: GenerationRequest) -> Result<RawGenerationResult> {
        let payload = serde_json::to_vec(&WireRequest::new(&request, false))
            .map_err(|e| GenerationError::InvalidRequest(format!("failed to encode request: {e}")))?;

        let mut child = self.command(&request).spawn().map_err(|source| GenerationError::Io {
            context: format!("failed to spawn generator `{}`", self.program),
            source,
        })?;

        let mut stdin = child.stdin.take().ok_or_else(|| GenerationError::Io {
            context: "generator stdin unavailable".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::BrokenPipe),
        })?;

        let write = async move {
            let written = stdin.write_all(&payload).await;
            drop(stdin);
            written
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());

        let output = output.map_err(|source| GenerationError::Io {
            context: format!("failed to wait for generator `{}`", self.program),
            source,
        })?;

        // A generator may legitimately exit without reading its input
        if let Err(e) = written
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(GenerationError::Io {
                context: "failed to write request to generator".to_string(),
                source: e,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(generator = %self.name, stderr = %stderr.trim(), "generator stderr");
        }

        if !output.status.success() {
            let message = last_line(&stderr)
                .map_or_else(|| format!("generator exited with {}", output.status), str::to_string);

            tracing::warn!(generator = %self.name, status = %output.status, "generator failed");

            return Ok(RawGenerationResult::Failure(message));
        }

        RawGenerationResult::decode(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|line| !line.is_empty())
}
