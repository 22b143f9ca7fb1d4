//! Error types for perm container decoding.

use std::fmt;

use thiserror::Error;

use crate::stream::{StreamId, StreamRole};

/// Errors that can occur while walking a container or resolving its meshes.
///
/// Apart from [`Error::Io`], none of these abort a decode; they are recorded
/// as diagnostics against the chunk or mesh they affect.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (a read or seek past the buffer end).
    #[error("{0}")]
    Common(#[from] xiasi_common::Error),

    /// A stream uses an element layout the decoder does not understand.
    #[error("unsupported encoding for stream {stream}: stride {stride}")]
    UnsupportedEncoding { stream: StreamId, stride: u32 },

    /// A descriptor references a stream that was never declared.
    #[error("{role} stream {id} not found")]
    StreamNotFound { role: StreamRole, id: StreamId },

    /// No descriptor in the file resolved a usable vertex pool.
    #[error("no descriptor resolved a vertex pool")]
    NoVertexPool,

    /// UV element count does not match the vertex count.
    #[error("UV count {uvs} does not match vertex count {vertices}")]
    UvCountMismatch { uvs: usize, vertices: usize },

    /// Index slice falls outside the decoded index stream.
    #[error("index range {start}..{end} exceeds {available} decoded indices")]
    IndexRange {
        start: u64,
        end: u64,
        available: usize,
    },

    /// Two meshes map to the same output file name.
    #[error("output name {name} is already taken, written as {renamed}")]
    NameCollision { name: String, renamed: String },

    /// Chunk header is truncated or declares a length past the buffer end.
    #[error("malformed chunk header at offset {offset}: {detail}")]
    MalformedHeader { offset: usize, detail: String },
}

impl Error {
    /// Classify this error into the decode taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            // Bounds failures are the only common errors the engine can hit.
            Error::Common(_) => ErrorKind::OutOfBounds,
            Error::UnsupportedEncoding { .. } => ErrorKind::UnsupportedEncoding,
            Error::StreamNotFound { .. } | Error::NoVertexPool => ErrorKind::StreamNotFound,
            Error::UvCountMismatch { .. } | Error::IndexRange { .. } => ErrorKind::CountMismatch,
            Error::MalformedHeader { .. } => ErrorKind::MalformedHeader,
            Error::NameCollision { .. } => ErrorKind::NameCollision,
        }
    }
}

/// Coarse error classification used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    Io,
    OutOfBounds,
    UnsupportedEncoding,
    StreamNotFound,
    CountMismatch,
    MalformedHeader,
    NameCollision,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Io => "io",
            ErrorKind::OutOfBounds => "out-of-bounds",
            ErrorKind::UnsupportedEncoding => "unsupported-encoding",
            ErrorKind::StreamNotFound => "stream-not-found",
            ErrorKind::CountMismatch => "count-mismatch",
            ErrorKind::MalformedHeader => "malformed-header",
            ErrorKind::NameCollision => "name-collision",
        };
        f.write_str(name)
    }
}

/// Result type for perm operations.
pub type Result<T> = std::result::Result<T, Error>;
