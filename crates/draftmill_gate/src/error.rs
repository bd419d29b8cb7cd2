//! Error types for the quality gate

use thiserror::Error;

/// Gate error type
#[derive(Error, Debug)]
pub enum GateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Queue error: {0}")]
    Queue(#[from] draftmill_queue::QueueError),

    #[error("Invalid batch manifest: {0}")]
    Manifest(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GateError>;
