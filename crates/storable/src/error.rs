//! Error types for thawing and for the JSON projection.

use storable_buffers::BufferError;
use thiserror::Error;

/// Error returned when a frozen buffer cannot be decoded.
///
/// Every variant is terminal: decoding stops at the first problem and no
/// partial value is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThawError {
    /// A read needed more bytes than the buffer had left.
    #[error("truncated input: {0}")]
    TruncatedInput(#[from] BufferError),
    /// The tag byte is not part of the recognised set.
    #[error("unknown tag 0x{0:02x}")]
    UnknownTag(u8),
    /// An index-bless referred to a class name that was never recorded.
    #[error("bless index {0} out of range")]
    InvalidBlessIndex(usize),
    /// A back-reference pointed at an object slot that does not exist yet.
    #[error("back-reference to missing object slot {0}")]
    InvalidBackReference(usize),
}

/// Error returned by [`Value::to_json`](crate::Value::to_json).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("value graph contains a cycle and cannot be written as JSON")]
    Cycle,
}
