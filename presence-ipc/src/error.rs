//! Error types for the presence transport

use thiserror::Error;

/// Errors that can occur on the presence IPC channel
#[derive(Debug, Error)]
pub enum IpcError {
    /// No presence socket could be found or opened
    #[error("no presence socket available: {0}")]
    SocketNotFound(String),

    /// The peer closed or reset the connection mid-frame
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The handshake was answered with something other than READY
    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),

    /// Malformed frame header or payload
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl IpcError {
    /// A short or failed read/write means the connection is gone.
    pub(crate) fn lost(err: std::io::Error) -> Self {
        IpcError::ConnectionLost(err.to_string())
    }
}
