//! Error types for the task board.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document {id} not found in collection {collection}")]
    NotFound { collection: String, id: String },

    #[error("Invalid task document {id}: {reason}")]
    InvalidTask { id: String, reason: String },

    #[error("Subscription to {0} closed by the store")]
    Closed(String),
}

impl From<toml::de::Error> for BoardError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
