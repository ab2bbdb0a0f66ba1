//! The `error` module defines the error types used within `livecomments`.
//!
//! Per-subscriber failures (`SendError`) never leave the hub; they only decide
//! whether a connection is torn down. `HubError` and `TransportError` are the
//! errors callers of the library can actually observe.

use std::time::Duration;

use thiserror::Error;

use crate::connection::ConnectionId;
use crate::hub::TopicId;

/// Why a frame could not be handed to a subscriber. Every kind is terminal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The connection was removed or its transport half is gone.
    #[error("connection closed")]
    Closed,

    /// The outbound queue stayed full for longer than the send timeout.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    /// The socket writer reported an I/O failure.
    #[error("transport failure")]
    TransportFailure,
}

/// Errors returned by `Hub::connect`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("connection is bound to topic {actual}, not {expected}")]
    TopicMismatch { expected: TopicId, actual: TopicId },

    #[error("connection {0} was already removed")]
    ConnectionRemoved(ConnectionId),
}

/// Errors raised while starting the WebSocket server. Once listening, accept
/// failures are logged and retried rather than returned.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
