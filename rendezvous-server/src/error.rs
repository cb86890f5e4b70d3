use rendezvous_core::ConnectionId;
use std::time::Duration;
use thiserror::Error;

/// Everything that can end a single connection early. None of these ever
/// leave the connection that produced them.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("connection closed before the address handshake")]
    HandshakeClosed,

    #[error("no address handshake within {0:?}")]
    HandshakeTimeout(Duration),

    #[error("malformed address handshake: {0}")]
    MalformedHandshake(#[source] serde_json::Error),

    #[error("failed to encode peer list: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("connection {0} is gone")]
    PeerGone(ConnectionId),
}
