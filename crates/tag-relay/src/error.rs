//! Error types for the tag relay.

use thiserror::Error;

/// A scanned payload that is not a clean sequence of hex digit pairs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Nothing to decode
    #[error("empty tag payload")]
    Empty,

    /// Hex digits must come in pairs
    #[error("odd-length tag payload ({0} bytes)")]
    OddLength(usize),

    /// A character outside 0-9, a-f, A-F
    #[error("invalid hex digit {found:?} at offset {offset}")]
    InvalidHex { offset: usize, found: char },
}

/// Tag relay error type.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Malformed scan payload
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Reader hardware failed to start or stopped responding
    #[error("Reader driver error: {0}")]
    DriverInit(String),

    /// Tag write failed in batch mode
    #[error("Tag write failed: {0}")]
    Write(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tag relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
