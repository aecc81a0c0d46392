//! Shared types for the podrelay crates

mod error;

pub use error::{ErrorBody, HttpError};
