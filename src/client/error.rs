//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the host.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The socket could not be opened.
    #[error("Failed to connect to host at {address}: {source}")]
    ConnectFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The pairing handshake could not be completed.
    #[error("Pairing handshake failed: {0}")]
    HandshakeFailed(String),

    /// An operation was attempted without a live connection.
    #[error("Not connected to host")]
    NotConnected,

    /// A callback was registered for an action the descriptor does not declare.
    #[error("Unknown action id: {0}")]
    UnknownAction(String),

    /// A callback was registered twice for the same action.
    #[error("Callback already registered for action: {0}")]
    CallbackAlreadyRegistered(String),

    /// IO error on the transport.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error on an outbound message.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
