use async_trait::async_trait;
use rendezvous_core::{ConnectionId, PeerList};
use rendezvous_server::{ConnectionHandle, ServerError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc, oneshot};

/// Mock ConnectionHandle that captures every peer list pushed to it.
pub struct MockConnection {
    id: ConnectionId,
    /// Channel to forward captured lists.
    tx: mpsc::UnboundedSender<PeerList>,
    /// All captured lists (for verification).
    sent: Mutex<Vec<PeerList>>,
    fail_sends: AtomicBool,
    closed: AtomicBool,
    /// When set, the first send parks until released.
    gate: Mutex<Option<SendGate>>,
}

struct SendGate {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// Test-side control for a gated MockConnection.
pub struct GateControl {
    /// Fires once the first send is parked.
    pub entered: oneshot::Receiver<()>,
    /// Lets the parked send finish.
    pub release: oneshot::Sender<()>,
}

impl MockConnection {
    /// Create a new MockConnection and its receiver channel.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PeerList>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Arc::new(Self {
            id: ConnectionId::new(),
            tx,
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            gate: Mutex::new(None),
        });
        (conn, rx)
    }

    /// Create a MockConnection whose first send stalls until the test lets it
    /// through, like a peer behind a slow link.
    pub async fn gated() -> (Arc<Self>, mpsc::UnboundedReceiver<PeerList>, GateControl) {
        let (conn, rx) = Self::new();
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();

        *conn.gate.lock().await = Some(SendGate {
            entered: entered_tx,
            release: release_rx,
        });

        let control = GateControl {
            entered: entered_rx,
            release: release_tx,
        };
        (conn, rx, control)
    }

    /// Create a MockConnection whose sends always fail, like a dead socket.
    pub fn failing() -> Arc<Self> {
        let (conn, _rx) = Self::new();
        conn.fail_sends.store(true, Ordering::SeqCst);
        conn
    }

    pub async fn sent(&self) -> Vec<PeerList> {
        self.sent.lock().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionHandle for MockConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, peers: &PeerList) -> Result<(), ServerError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ServerError::PeerGone(self.id));
        }

        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.await;
        }

        tracing::debug!("[MockConnection] send to {}: {:?}", self.id, peers);
        self.sent.lock().await.push(peers.clone());
        let _ = self.tx.send(peers.clone());
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_connection_captures_lists() {
        let (conn, mut rx) = MockConnection::new();

        conn.send(&Vec::new()).await.unwrap();

        assert_eq!(rx.recv().await, Some(Vec::new()));
        assert_eq!(conn.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_connection_rejects_sends() {
        let conn = MockConnection::failing();

        assert!(conn.send(&Vec::new()).await.is_err());
        assert!(conn.sent().await.is_empty());
    }
}
