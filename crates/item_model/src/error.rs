//! Error types for item store operations

use crate::ItemId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItemModelError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Item already present: {0}")]
    DuplicateItem(ItemId),

    #[error("Item {0} cannot hold children")]
    NotAContainer(ItemId),

    #[error("Item {0} cannot hold attachments")]
    NotAttachable(ItemId),

    #[error("Invalid item id: {0}")]
    InvalidId(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ItemModelError>;
