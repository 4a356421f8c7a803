//! Error types for hit testing

use arrange_engine::{ArrangeError, VePath};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HitTestError {
    #[error("Arrange error: {0}")]
    Arrange(#[from] ArrangeError),

    #[error("Detailed table at {0} has no child area")]
    MissingChildArea(VePath),

    #[error("Hit test invariant violated at {path}: {message}")]
    Invariant { path: VePath, message: String },
}

impl HitTestError {
    /// Build an invariant violation and log it
    pub fn invariant(path: &VePath, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(path = %path, %message, "hit test invariant violated");
        HitTestError::Invariant {
            path: path.clone(),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, HitTestError>;
