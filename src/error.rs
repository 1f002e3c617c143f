//! Error types for building, loading and querying tries.

use std::io;
use thiserror::Error;

/// Errors reported by trie construction, serialization and search.
#[derive(Error, Debug)]
pub enum Error {
    /// An operation was attempted before its required setup.
    ///
    /// Querying a trie that was never built or loaded, or initializing an
    /// agent's search state twice.
    #[error("invalid state: {0}")]
    State(&'static str),

    /// The caller passed a disallowed or nonsensical argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An index is outside the valid range, e.g. an unknown key id.
    #[error("index out of bounds: {index} >= {len}")]
    Bound { index: usize, len: usize },

    /// A value is outside its permitted range, e.g. an empty tail entry.
    #[error("value out of range: {0}")]
    Range(&'static str),

    /// A configuration word carries undefined bits or values.
    #[error("undefined configuration code: {0:#x}")]
    Code(u32),

    /// A length exceeds a 32-bit or word-width limit.
    #[error("size limit exceeded: {0}")]
    Size(&'static str),

    /// An allocation requested by a loaded length could not be satisfied.
    #[error("memory allocation failed for {0} bytes")]
    Memory(usize),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Loaded bytes fail the magic check or carry inconsistent counts.
    #[error("invalid format: {0}")]
    Format(String),
}

/// Result type alias for trie operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }
}
