//! Error types for xiasi-common.

use thiserror::Error;

/// Common error type for Xiasi operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A read or seek would go past the end of the buffer.
    #[error("out of bounds at offset {offset}: needed {needed} bytes but only {available} available")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Missing null terminator in string.
    #[error("string missing null terminator")]
    MissingNullTerminator,
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
