//! Error types for the sync engine.

use thiserror::Error;
use worldsync_protocol::{DecodeError, EncodeError};

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while establishing a connection.
///
/// All of these are fatal to the client instance; there is no retry.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// The target address could not be parsed or has an unsupported scheme.
    #[error("invalid server address {address:?}: {reason}")]
    InvalidAddress {
        /// The address as supplied.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The server refused the connection.
    #[error("connection refused: {0}")]
    Refused(String),

    /// The WebSocket handshake failed.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The handshake did not complete within the connect timeout.
    #[error("connect timed out")]
    Timeout,
}

/// Errors raised by `Transport::send`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The connection is not open.
    #[error("not connected to server")]
    NotConnected,

    /// The transport failed while writing the frame.
    #[error("send failed: {0}")]
    Transport(String),
}

/// Errors raised by `Transport::receive_next`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiveError {
    /// The peer closed the connection.
    #[error("connection closed by peer")]
    PeerClosed,

    /// The transport failed while reading.
    #[error("receive failed: {0}")]
    TransportFailure(String),

    /// The connection was already closed locally.
    #[error("not connected to server")]
    NotConnected,
}

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Connecting failed.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Sending failed.
    #[error(transparent)]
    Send(#[from] SendError),

    /// Receiving failed.
    #[error(transparent)]
    Receive(#[from] ReceiveError),

    /// An inbound frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An outbound message could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid state transition.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// A background task panicked or was aborted.
    #[error("task failed: {0}")]
    Task(String),
}

impl ReceiveError {
    /// Returns true if the connection ended without a transport fault.
    pub fn is_clean(&self) -> bool {
        matches!(self, ReceiveError::PeerClosed | ReceiveError::NotConnected)
    }
}
