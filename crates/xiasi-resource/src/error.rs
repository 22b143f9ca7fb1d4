//! Error types for resource scanning and browsing.

use thiserror::Error;

/// Errors that can occur while scanning or browsing resources.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] xiasi_common::Error),

    /// Directory traversal error.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for resource operations.
pub type Result<T> = std::result::Result<T, Error>;
