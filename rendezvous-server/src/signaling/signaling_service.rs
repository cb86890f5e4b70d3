use crate::ServerConfig;
use crate::room::RoomRegistry;
use crate::signaling::{ConnectionDriver, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

struct SignalingInner {
    registry: RoomRegistry,
    driver: ConnectionDriver,
    config: ServerConfig,
}

/// Shared state handed to every WebSocket handler.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(config: ServerConfig) -> Self {
        let registry = RoomRegistry::new();
        let driver = ConnectionDriver::new(registry.clone(), config.handshake_timeout);

        Self {
            inner: Arc::new(SignalingInner {
                registry,
                driver,
                config,
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    pub fn driver(&self) -> &ConnectionDriver {
        &self.inner.driver
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(&self.inner.config.route_path(), get(ws_handler))
            .with_state(self.clone())
    }
}

/// Binds `config.bind_addr` and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    serve_with_listener(listener, SignalingService::new(config), shutdown_signal()).await
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    service: SignalingService,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(
        "Signaling server listening on ws://{}{}",
        addr,
        service.config().route_path()
    );

    axum::serve(
        listener,
        service
            .router()
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("Signaling server failed")?;

    info!("Signaling server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
