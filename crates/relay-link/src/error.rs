//! Link error types.

use thiserror::Error;

/// Link error type.
#[derive(Error, Debug)]
pub enum LinkError {
    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Endpoint unreachable or refused the connection
    #[error("Connection error: {0}")]
    Connect(String),

    /// Connect did not finish within the configured timeout
    #[error("Connect timed out after {0} ms")]
    ConnectTimeout(u64),

    /// Write failed on an established connection
    #[error("Failed to send message: {0}")]
    Send(String),

    /// Remote side already closed the connection
    #[error("Connection closed by remote")]
    Closed,
}

/// Result type alias using LinkError.
pub type LinkResult<T> = Result<T, LinkError>;
