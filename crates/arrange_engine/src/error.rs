//! Error types for the arrange engine

use crate::VePath;
use item_model::ItemId;
use thiserror::Error;

/// Malformed visual element path text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,

    #[error("Path '{0}' has an empty segment")]
    EmptySegment(String),

    #[error("Path '{0}' has a doubled delimiter")]
    DoubledDelimiter(String),

    #[error("Path '{0}' starts with a bracket")]
    LeadingBracket(String),

    #[error("Segment '{segment}' of path '{path}' has an id of the wrong length")]
    BadIdLength { path: String, segment: String },

    #[error("Segment '{segment}' of path '{path}' has an unterminated bracket")]
    UnterminatedBracket { path: String, segment: String },

    #[error("Segment '{segment}' of path '{path}' has an invalid id")]
    InvalidId { path: String, segment: String },
}

#[derive(Debug, Error)]
pub enum ArrangeError {
    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    #[error("No visual element cached at {0}")]
    CacheMiss(VePath),

    #[error("Arrange requested while a pass is already running")]
    ReentrantArrange,

    #[error("No arrange pass is running")]
    NoPassRunning,

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Invariant violated at {path}: {message}")]
    Invariant { path: VePath, message: String },

    #[error("Item model error: {0}")]
    ItemModel(#[from] item_model::ItemModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl ArrangeError {
    /// Build an invariant violation and log it
    pub fn invariant(path: &VePath, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(path = %path, %message, "arrange invariant violated");
        ArrangeError::Invariant {
            path: path.clone(),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArrangeError>;
