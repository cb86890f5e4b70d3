use crate::ServerError;
use crate::transport::{ConnectionHandle, TransportEvent};
use async_trait::async_trait;
use axum::extract::ws::Message;
use bytes::Bytes;
use rendezvous_core::{ConnectionId, PeerList};
use tokio::sync::mpsc;

/// [`ConnectionHandle`] over a WebSocket whose write half is owned by a
/// writer task fed through an unbounded channel.
pub struct WsConnectionHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Message>,
}

impl WsConnectionHandle {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: ConnectionId::new(),
            tx,
        }
    }
}

#[async_trait]
impl ConnectionHandle for WsConnectionHandle {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, peers: &PeerList) -> Result<(), ServerError> {
        let json = serde_json::to_string(peers).map_err(ServerError::Encode)?;

        self.tx
            .send(Message::Text(json.into()))
            .map_err(|_| ServerError::PeerGone(self.id))
    }

    async fn close(&self) {
        let _ = self.tx.send(Message::Close(None));
    }
}

impl From<Message> for TransportEvent {
    fn from(msg: Message) -> Self {
        match msg {
            Message::Text(text) => {
                TransportEvent::Message(Bytes::copy_from_slice(text.as_str().as_bytes()))
            }
            Message::Binary(data) => TransportEvent::Message(data),
            Message::Ping(_) | Message::Pong(_) => TransportEvent::Keepalive,
            Message::Close(_) => TransportEvent::Closed,
        }
    }
}
