#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Turns generation results into servable audio files
//!
//! A [`Materializer`] owns one public directory. Each successful call copies
//! the generated audio into it under a fresh random name, staging the bytes
//! so a half-written file is never visible under its final name.

mod error;
mod filename;
mod materializer;
mod retention;

pub use error::{MaterializationError, Result};
pub use filename::{TOKEN_BITS, generate_filename, is_artifact_name};
pub use materializer::{MaterializedArtifact, Materializer};
pub use retention::{SweepReport, spawn_retention_sweeper};
