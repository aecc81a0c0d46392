use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{GenerationError, Result};

/// Outcome reported by a generation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawGenerationResult {
    /// Path to a finished audio file
    FilePath(PathBuf),
    /// Result record carrying the audio path and optional status text
    Object {
        audio_path: PathBuf,
        details: Option<String>,
    },
    /// The service reported failure with this message
    Failure(String),
}

impl RawGenerationResult {
    /// Decode a backend's textual output
    ///
    /// Accepted forms, in order:
    /// - a JSON object with a string `audio_path` (and optional `details`)
    /// - a JSON object with a string `error`
    /// - a JSON string, or plain text, naming an existing regular file,
    ///   which becomes [`Self::FilePath`]
    /// - anything else becomes [`Self::Failure`] with the trimmed text
    ///   verbatim
    ///
    /// Backends often log before printing their result, so when the whole
    /// payload is not JSON the last line is tried on its own as a path or a
    /// JSON result. A failure message always keeps every line.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnrecognizedShape`] for JSON that matches
    /// none of the forms above
    pub fn decode(payload: &str) -> Result<Self> {
        let payload = payload.trim();

        if payload.is_empty() {
            return Ok(Self::Failure("generation service returned no output".to_string()));
        }

        if let Ok(value) = serde_json::from_str::<Value>(payload) {
            return Self::from_json(value);
        }

        let last_line = payload
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or(payload);

        if last_line == payload {
            return Ok(Self::from_text(payload));
        }

        let file = match serde_json::from_str::<Value>(last_line) {
            Ok(value @ Value::Object(_)) => return Self::from_json(value),
            Ok(Value::String(text)) => Self::existing_file(text.trim()),
            _ => Self::existing_file(last_line),
        };

        Ok(file.unwrap_or_else(|| Self::Failure(payload.to_string())))
    }

    /// Classify a bare string: an existing regular file, or an error message
    pub fn from_text(text: &str) -> Self {
        Self::existing_file(text).unwrap_or_else(|| Self::Failure(text.to_string()))
    }

    fn existing_file(text: &str) -> Option<Self> {
        let path = Path::new(text);
        path.is_file().then(|| Self::FilePath(path.to_path_buf()))
    }

    fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Self::from_text(text.trim())),
            Value::Object(map) => Self::from_object(map),
            other => Err(GenerationError::UnrecognizedShape(other.to_string())),
        }
    }

    fn from_object(map: Map<String, Value>) -> Result<Self> {
        if let Some(Value::String(audio_path)) = map.get("audio_path") {
            return Ok(Self::Object {
                audio_path: PathBuf::from(audio_path),
                details: map.get("details").and_then(Value::as_str).map(str::to_string),
            });
        }

        if !map.contains_key("audio_path")
            && let Some(Value::String(message)) = map.get("error")
        {
            return Ok(Self::Failure(message.clone()));
        }

        Err(GenerationError::UnrecognizedShape(Value::Object(map).to_string()))
    }

    /// Short label for logs
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::FilePath(_) => "file_path",
            Self::Object { .. } => "object",
            Self::Failure(_) => "failure",
        }
    }
}
