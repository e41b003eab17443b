//! Error types for a generation attempt
//!
//! Every failure a session can end with is one of these variants, and each
//! variant's `Display` is exactly the message shown to the user. Nothing here
//! propagates past the controller: it is converted into an `ErrorInfo` and
//! recorded on the session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Please enter a topic";
pub const CANCELLED_MESSAGE: &str = "Generation cancelled.";
pub const TIMEOUT_MESSAGE: &str =
    "Request timed out. The ebook generation is taking longer than expected.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{}", VALIDATION_MESSAGE)]
    Validation,
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Parse(String),
    #[error("{}", CANCELLED_MESSAGE)]
    Cancelled,
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Validation => ErrorKind::Validation,
            GenerationError::Http { .. } => ErrorKind::Http,
            GenerationError::Timeout => ErrorKind::Timeout,
            GenerationError::Network(_) => ErrorKind::Network,
            GenerationError::Parse(_) => ErrorKind::Parse,
            GenerationError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::Parse(err.to_string())
        } else if err.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Parse(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Http,
    Timeout,
    Network,
    Parse,
    Cancelled,
}

/// User-facing failure of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&GenerationError> for ErrorInfo {
    fn from(err: &GenerationError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
