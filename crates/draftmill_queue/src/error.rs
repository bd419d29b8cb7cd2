//! Error types for the topic queue

use crate::topic::TopicStatus;
use thiserror::Error;

/// Queue error type
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Topic not found: {0}")]
    NotFound(String),

    /// Operation attempted from the wrong status. This is a programmer
    /// error on the caller's side and is raised rather than swallowed so
    /// double-completion bugs are caught.
    #[error("Invalid transition for topic '{id}': cannot {op} from status '{from}'")]
    InvalidTransition {
        id: String,
        from: TopicStatus,
        op: &'static str,
    },

    #[error("Duplicate topic: {0}")]
    DuplicateTopic(String),

    /// The shared document was rewritten by another writer between our
    /// load and save. The caller should reload and retry.
    #[error("Store version conflict: snapshot at {expected}, document at {found}")]
    Conflict { expected: u64, found: u64 },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, QueueError>;
