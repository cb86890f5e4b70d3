use crate::SignalingService;
use crate::ServerError;
use crate::transport::{ConnectionHandle, TransportEvent, WsConnectionHandle};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use rendezvous_core::RoomId;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    pub room: Option<String>,
}

/// `GET /ws?room=<id>`. Requests without a room are refused before the
/// upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<RoomQuery>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    State(service): State<SignalingService>,
) -> Response {
    let room_id = match query.room.as_deref().map(RoomId::parse) {
        Some(Ok(room_id)) => room_id,
        _ => {
            warn!("Rejecting connection from {}: no room id", remote);
            return (StatusCode::BAD_REQUEST, "missing room id").into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, room_id, remote, service))
}

async fn handle_socket(
    socket: WebSocket,
    room_id: RoomId,
    remote: SocketAddr,
    service: SignalingService,
) {
    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = Arc::new(WsConnectionHandle::new(tx));
    let id = handle.id();
    info!(
        "New WebSocket connection {} from {} for room '{}'",
        id, remote, room_id
    );

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
        let _ = sender.close().await;
    });

    let inbound = receiver.map(|frame| {
        frame
            .map(TransportEvent::from)
            .map_err(|e| ServerError::Transport(e.to_string()))
    });

    if let Err(e) = service.driver().run(room_id, remote.ip(), handle, inbound).await {
        debug!("Connection {} ended before joining: {}", id, e);
    }

    let _ = send_task.await;
    info!("WebSocket disconnected: {}", id);
}
