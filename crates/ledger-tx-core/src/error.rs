//! Error types for the ledger transaction core.

use thiserror::Error;

/// Errors raised while encoding, decoding or dispatching a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    /// The envelope carries a message tag this build does not know.
    ///
    /// Newer protocol versions may add message kinds; older nodes reject
    /// them through this error instead of halting.
    #[error("unknown message kind: tag {0}")]
    UnknownMessageKind(u64),
}

impl CoreError {
    pub(crate) fn decoding(msg: impl Into<String>) -> Self {
        CoreError::DecodingError(msg.into())
    }
}

/// Validation errors for message fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("malformed address in {field}: expected {expected} bytes, got {got}")]
    MalformedAddress {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{field} length {len} out of range [{min}, {max}]")]
    LengthOutOfRange {
        field: &'static str,
        len: usize,
        min: usize,
        max: usize,
    },

    #[error("forbidden character {byte:#04x} in {field} at position {position}")]
    ForbiddenCharacter {
        field: &'static str,
        byte: u8,
        position: usize,
    },

    #[error("invalid coin in {field}: {reason}")]
    InvalidCoin {
        field: &'static str,
        reason: &'static str,
    },

    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}
