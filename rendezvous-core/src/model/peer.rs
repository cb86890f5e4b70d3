use serde::{Deserialize, Serialize};
use std::fmt;

/// Port a peer listens on for the peer-to-peer protocol.
///
/// Clients send it either as a JSON string or as a number; it always goes
/// back out as a string.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Hash, Eq, PartialEq)]
#[serde(from = "RawPort")]
pub struct Port(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPort {
    Text(String),
    Number(u64),
}

impl From<RawPort> for Port {
    fn from(raw: RawPort) -> Self {
        match raw {
            RawPort::Text(text) => Self(text),
            RawPort::Number(number) => Self(number.to_string()),
        }
    }
}

impl Port {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Port {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Port {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u16> for Port {
    fn from(port: u16) -> Self {
        Self(port.to_string())
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address tuple other peers use to reach this one.
///
/// `public_ip` is always the address the server observed on the connection,
/// never a value taken from the client.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct PeerRecord {
    pub public_ip: String,
    pub private_ip: String,
    pub port: Port,
}
