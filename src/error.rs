//! Error types for PyExec

use thiserror::Error;

/// Result type alias using PyExec's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for PyExec
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interpreter worker error (spawn, pipe, or protocol failure)
    #[error("Worker error: {0}")]
    Worker(String),

    /// Script storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if error is a client error (user's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::NotFound(_))
    }
}

impl From<which::Error> for Error {
    fn from(err: which::Error) -> Self {
        Error::Config(format!("Interpreter lookup failed: {}", err))
    }
}
