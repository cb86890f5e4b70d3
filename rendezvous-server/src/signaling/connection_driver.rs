use crate::room::{Broadcaster, RoomRegistry};
use crate::transport::{ConnectionHandle, TransportEvent};
use crate::ServerError;
use futures::{Stream, StreamExt};
use rendezvous_core::{AddressReport, ConnectionId, RoomId};
use serde::de::Error as _;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport upgraded, nothing read yet.
    Connecting,
    /// Waiting for the peer's address report.
    AwaitingHandshake,
    /// Joined; reads only detect liveness.
    Active,
    Closed,
}

impl ConnectionState {
    fn advance_to(&mut self, id: ConnectionId, next: ConnectionState) {
        debug!("Connection {}: {:?} -> {:?}", id, self, next);
        *self = next;
    }
}

/// Runs one connection from handshake to cleanup.
///
/// The driver never holds a registry lock across an await: joins, leaves and
/// snapshots are short synchronous calls, sends happen afterwards.
#[derive(Clone)]
pub struct ConnectionDriver {
    registry: RoomRegistry,
    broadcaster: Broadcaster,
    handshake_timeout: Option<Duration>,
}

impl ConnectionDriver {
    pub fn new(registry: RoomRegistry, handshake_timeout: Option<Duration>) -> Self {
        Self {
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
            handshake_timeout,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Drives a connection until it goes away.
    ///
    /// Returns an error only when the handshake failed, in which case the
    /// registry was never touched. A dropped connection after joining is the
    /// normal way out and yields `Ok(())`.
    pub async fn run<S>(
        &self,
        room_id: RoomId,
        observed: IpAddr,
        handle: Arc<dyn ConnectionHandle>,
        mut inbound: S,
    ) -> Result<(), ServerError>
    where
        S: Stream<Item = Result<TransportEvent, ServerError>> + Unpin + Send,
    {
        let id = handle.id();
        let mut state = ConnectionState::Connecting;
        state.advance_to(id, ConnectionState::AwaitingHandshake);

        let outcome = match self.await_handshake(&mut inbound).await {
            Ok(report) => {
                let record = report.into_record(observed);
                info!("New peer {} in room '{}': {:?}", id, room_id, record);

                self.registry.join(&room_id, handle.clone(), record);
                state.advance_to(id, ConnectionState::Active);
                self.broadcaster.announce(&room_id).await;

                // Anything the peer sends from here on is ignored.
                while let Some(event) = inbound.next().await {
                    match event {
                        Ok(TransportEvent::Closed) => break,
                        Ok(_) => {}
                        Err(e) => {
                            debug!("Read failed for {}: {}", id, e);
                            break;
                        }
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!("Handshake failed for {} in room '{}': {}", id, room_id, e);
                Err(e)
            }
        };

        self.close(&room_id, handle.as_ref(), &mut state).await;
        outcome
    }

    /// Leaves the room if the connection ever joined it, then releases the
    /// handle.
    async fn close(
        &self,
        room_id: &RoomId,
        handle: &dyn ConnectionHandle,
        state: &mut ConnectionState,
    ) {
        let id = handle.id();

        if *state == ConnectionState::Active {
            if let Some(record) = self.registry.leave(room_id, id) {
                info!("Peer {} left room '{}': {:?}", id, room_id, record);
            }
            self.broadcaster.announce(room_id).await;
        }

        state.advance_to(id, ConnectionState::Closed);
        handle.close().await;
    }

    async fn await_handshake<S>(&self, inbound: &mut S) -> Result<AddressReport, ServerError>
    where
        S: Stream<Item = Result<TransportEvent, ServerError>> + Unpin + Send,
    {
        match self.handshake_timeout {
            Some(limit) => tokio::time::timeout(limit, read_handshake(inbound))
                .await
                .map_err(|_| ServerError::HandshakeTimeout(limit))?,
            None => read_handshake(inbound).await,
        }
    }
}

async fn read_handshake<S>(inbound: &mut S) -> Result<AddressReport, ServerError>
where
    S: Stream<Item = Result<TransportEvent, ServerError>> + Unpin + Send,
{
    loop {
        match inbound.next().await {
            Some(Ok(TransportEvent::Message(payload))) => {
                return parse_address_report(&payload);
            }
            Some(Ok(TransportEvent::Keepalive)) => continue,
            Some(Ok(TransportEvent::Closed)) | None => return Err(ServerError::HandshakeClosed),
            Some(Err(e)) => return Err(e),
        }
    }
}

/// The handshake must be a JSON object; serde would otherwise also accept a
/// positional array for a struct.
fn parse_address_report(payload: &[u8]) -> Result<AddressReport, ServerError> {
    let value: serde_json::Value =
        serde_json::from_slice(payload).map_err(ServerError::MalformedHandshake)?;

    if !value.is_object() {
        return Err(ServerError::MalformedHandshake(serde_json::Error::custom(
            "address report must be a JSON object",
        )));
    }

    serde_json::from_value(value).map_err(ServerError::MalformedHandshake)
}
