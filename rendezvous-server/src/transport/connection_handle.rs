use crate::ServerError;
use async_trait::async_trait;
use rendezvous_core::{ConnectionId, PeerList};

/// Outbound side of one peer's connection, as stored in the room registry.
///
/// Implementations must not block for long in `send`: it is called once per
/// member during every announce pass.
#[async_trait]
pub trait ConnectionHandle: Send + Sync {
    /// Identity of the connection; stable for its whole life.
    fn id(&self) -> ConnectionId;

    /// Push a peer list to the client.
    async fn send(&self, peers: &PeerList) -> Result<(), ServerError>;

    /// Ask the transport to close the connection.
    async fn close(&self);
}
