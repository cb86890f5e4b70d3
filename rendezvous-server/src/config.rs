use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WS_PATH: &str = "/ws";
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listening address for the HTTP/WebSocket endpoint.
    pub bind_addr: SocketAddr,
    /// Route that accepts `?room=<id>` upgrade requests.
    pub ws_path: String,
    /// How long a freshly upgraded connection may stay silent before its
    /// address handshake. `None` waits forever.
    pub handshake_timeout: Option<Duration>,
}

impl ServerConfig {
    /// `ws_path` with a guaranteed leading slash, as the router expects.
    pub fn route_path(&self) -> String {
        if self.ws_path.starts_with('/') {
            self.ws_path.clone()
        } else {
            format!("/{}", self.ws_path)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            ws_path: DEFAULT_WS_PATH.to_string(),
            handshake_timeout: Some(DEFAULT_HANDSHAKE_TIMEOUT),
        }
    }
}
