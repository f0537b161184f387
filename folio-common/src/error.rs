//! Common error types for Folio

use thiserror::Error;

/// Common result type for Folio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the store, registry and validators
///
/// `NotFound` and `InvalidInput` carry messages that are shown to the site
/// operator as-is, so their display form has no prefix.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be parsed or serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("{0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("{0}")]
    InvalidInput(String),
}

impl Error {
    /// True for errors caused by the caller rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::InvalidInput(_))
    }
}
