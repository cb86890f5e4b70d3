use bytes::Bytes;

/// What a connection's inbound side produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A data frame, text or binary.
    Message(Bytes),
    /// Ping/pong traffic; carries no payload for the server.
    Keepalive,
    /// The peer sent a close frame.
    Closed,
}
