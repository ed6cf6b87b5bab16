//! Error types for the transform actor

use std::io;

use thiserror::Error;

/// Result type alias for the transform actor
pub type Result<T> = std::result::Result<T, Error>;

/// Transform actor errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// AI transform failure (external LLM call)
    #[error("AI transform failed: {0}")]
    Ai(String),

    /// Dataset sink failure
    #[error("Dataset append failed: {0}")]
    Dataset(String),

    /// Platform API returned a non-success status
    #[error("Platform API error ({status}): {context}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Which call failed
        context: String,
    },

    /// Actor build failure or timeout
    #[error("Build failed: {0}")]
    Build(String),

    /// Agent scaffolding failure
    #[error("Scaffold failed: {0}")]
    Scaffold(String),

    /// A required scaffold file is missing
    #[error("Required file missing from scaffold: {0}")]
    MissingFile(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
