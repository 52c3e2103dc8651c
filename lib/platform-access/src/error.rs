//! Error types for user and session persistence.

use std::fmt;

/// Errors from `UserStore` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store rejected or failed the operation.
    Backend { reason: String },
}

impl StoreError {
    /// Wraps a backend error message.
    #[must_use]
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { reason } => write!(f, "user store backend error: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}
