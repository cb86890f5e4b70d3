use rendezvous_core::PeerList;
use rendezvous_server::{ConnectionDriver, RoomRegistry, ServerError};
use serde_json::json;
use std::time::Duration;

use crate::integration::{create_test_driver, init_tracing};
use crate::utils::{TestPeer, room};

#[tokio::test]
async fn test_malformed_handshake_never_joins() {
    init_tracing();

    let (driver, registry) = create_test_driver();

    let peer = TestPeer::spawn(&driver, "r1", "203.0.113.9");
    peer.feed.text("this is not json");

    let result = peer.task.await.expect("driver panicked");
    assert!(matches!(result, Err(ServerError::MalformedHandshake(_))));
    assert!(!registry.contains_room(&room("r1")));
    assert!(peer.conn.sent().await.is_empty());
    assert!(peer.conn.is_closed());
}

#[tokio::test]
async fn test_non_object_handshake_is_malformed() {
    let (driver, registry) = create_test_driver();

    let peer = TestPeer::spawn(&driver, "r1", "203.0.113.9");
    peer.feed.handshake(json!(["10.0.0.5", "5000"]));

    let result = peer.task.await.expect("driver panicked");
    assert!(matches!(result, Err(ServerError::MalformedHandshake(_))));
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_disconnect_before_handshake_never_joins() {
    let (driver, registry) = create_test_driver();

    let peer = TestPeer::spawn(&driver, "r1", "203.0.113.9");
    peer.feed.disconnect();

    let result = peer.task.await.expect("driver panicked");
    assert!(matches!(result, Err(ServerError::HandshakeClosed)));
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_close_frame_before_handshake_never_joins() {
    let (driver, registry) = create_test_driver();

    let peer = TestPeer::spawn(&driver, "r1", "203.0.113.9");
    peer.feed.close();

    let result = peer.task.await.expect("driver panicked");
    assert!(matches!(result, Err(ServerError::HandshakeClosed)));
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_read_error_before_handshake_is_reported() {
    let (driver, registry) = create_test_driver();

    let peer = TestPeer::spawn(&driver, "r1", "203.0.113.9");
    peer.feed.fail();

    let result = peer.task.await.expect("driver panicked");
    assert!(matches!(result, Err(ServerError::Transport(_))));
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_keepalives_before_handshake_are_skipped() {
    let (driver, registry) = create_test_driver();

    let mut peer = TestPeer::spawn(&driver, "r1", "203.0.113.9");
    peer.feed.keepalive();
    peer.feed.keepalive();
    peer.feed.handshake(json!({ "private_ip": "10.0.0.5", "port": "5000" }));

    assert_eq!(peer.next_list().await.expect("first list"), PeerList::new());
    assert_eq!(registry.member_count(&room("r1")), 1);
}

#[tokio::test(start_paused = true)]
async fn test_silent_peer_hits_handshake_deadline() {
    let registry = RoomRegistry::new();
    let driver = ConnectionDriver::new(registry.clone(), Some(Duration::from_secs(10)));

    let peer = TestPeer::spawn(&driver, "r1", "203.0.113.9");

    let result = peer.task.await.expect("driver panicked");
    assert!(matches!(
        result,
        Err(ServerError::HandshakeTimeout(limit)) if limit == Duration::from_secs(10)
    ));
    assert_eq!(registry.room_count(), 0);
    assert!(peer.conn.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_no_deadline_waits_for_late_handshake() {
    let registry = RoomRegistry::new();
    let driver = ConnectionDriver::new(registry.clone(), None);

    let mut peer = TestPeer::spawn(&driver, "r1", "203.0.113.9");
    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert!(!peer.task.is_finished());

    peer.feed.handshake(json!({ "private_ip": "10.0.0.5", "port": "5000" }));
    assert_eq!(peer.next_list().await.expect("first list"), PeerList::new());
}
