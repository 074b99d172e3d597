//! Error types for the store.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store was closed; no further operations are possible.
    #[error("store is closed")]
    Closed,

    /// Forget must name the full history explicitly; deleting "the
    /// latest" would silently leave older versions behind.
    #[error("forget requires history mode All")]
    ForgetRequiresAllHistories,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
