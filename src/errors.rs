/*!
 * Error types for the vocab-drill application.
 *
 * The core only distinguishes one failure kind: a remote call that did not
 * succeed. Local invariant violations (duplicate add, update of a word that
 * is not in session) are reported through `Ok(false)` instead.
 */

use thiserror::Error;

/// Errors that can occur when talking to the remote word store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Non-success HTTP response, transport error or undecodable body
    #[error("Network request failed: {0}")]
    NetworkFailure(String),
}

impl StoreError {
    /// Build a failure from an HTTP status and the response body
    pub fn status(status_code: u16, body: impl AsRef<str>) -> Self {
        let body = body.as_ref().trim();
        if body.is_empty() {
            Self::NetworkFailure(format!("server responded with status {}", status_code))
        } else {
            Self::NetworkFailure(format!("server responded with status {}: {}", status_code, body))
        }
    }

    /// The human readable message carried by the error
    pub fn message(&self) -> &str {
        match self {
            Self::NetworkFailure(message) => message,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkFailure(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the remote word store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
