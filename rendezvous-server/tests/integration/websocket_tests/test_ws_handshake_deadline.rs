use rendezvous_server::ServerConfig;
use std::time::Duration;

use crate::utils::{TestClient, TestServer};

#[tokio::test]
async fn test_silent_client_is_disconnected() {
    let config = ServerConfig {
        handshake_timeout: Some(Duration::from_millis(200)),
        ..ServerConfig::default()
    };
    let server = TestServer::start(config).await.expect("Failed to start server");

    let mut client = TestClient::connect(&server.url(Some("r1")))
        .await
        .expect("Failed to connect");

    client
        .expect_closed()
        .await
        .expect("server should close a silent client");
    assert_eq!(server.service.registry().room_count(), 0);

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_handshake_closes_connection() {
    let server = TestServer::start(ServerConfig::default())
        .await
        .expect("Failed to start server");

    let mut client = TestClient::connect(&server.url(Some("r1")))
        .await
        .expect("Failed to connect");
    client
        .send_json(serde_json::json!("not an address report"))
        .await
        .expect("Failed to send");

    client.expect_closed().await.expect("server should close the connection");
    assert_eq!(server.service.registry().room_count(), 0);

    server.stop().await;
}
