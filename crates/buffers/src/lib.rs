//! Byte cursor primitives for the storable decoder.
//!
//! The cursor never reads past the end of its buffer: every read either
//! returns the requested bytes or fails with [`BufferError::EndOfBuffer`]
//! and leaves the cursor where it was.

mod reader;

pub use reader::Reader;

use thiserror::Error;

/// Error returned by bounds-checked [`Reader`] operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read asked for more bytes than remain in the buffer.
    #[error("end of buffer: wanted {wanted} bytes at offset {offset}, {remaining} remaining")]
    EndOfBuffer {
        offset: usize,
        wanted: usize,
        remaining: usize,
    },
}
