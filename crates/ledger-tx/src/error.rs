//! Error types for the dispatch pipeline.

use std::time::Duration;

use ledger_tx_core::{CoreError, ValidationError};
use thiserror::Error;

/// Errors that can occur while checking or delivering a transaction.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The raw transaction exceeds the configured size limit.
    #[error("transaction too large: {size} bytes exceeds limit of {max}")]
    TxTooLarge { size: usize, max: usize },

    /// Decoding failed or the message kind is unknown.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// The message failed field validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No handler is registered for the message path.
    #[error("no route for path: {0}")]
    NoRoute(String),

    /// A handler is already registered for the path.
    #[error("route already registered: {0}")]
    DuplicateRoute(String),

    /// The handler rejected the message.
    #[error("handler error: {0:#}")]
    Handler(anyhow::Error),

    /// The handler did not finish in time.
    #[error("handler for {path} timed out after {timeout:?}")]
    HandlerTimeout { path: &'static str, timeout: Duration },
}

impl DispatchError {
    /// True if the transaction carried a message kind this build does not know.
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, DispatchError::Core(CoreError::UnknownMessageKind(_)))
    }
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
