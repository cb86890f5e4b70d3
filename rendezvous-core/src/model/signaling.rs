use crate::model::peer::{PeerRecord, Port};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Server → client push: every other member of the room.
pub type PeerList = Vec<PeerRecord>;

/// Client → server handshake, sent exactly once right after connecting.
///
/// A `public_ip` field may be present on the wire; it is ignored. Missing
/// fields fall back to empty values.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AddressReport {
    pub private_ip: String,
    pub port: Port,
}

impl AddressReport {
    /// Builds the stored record, taking the public address from the
    /// transport rather than from anything the client said.
    pub fn into_record(self, observed: IpAddr) -> PeerRecord {
        PeerRecord {
            public_ip: observed.to_canonical().to_string(),
            private_ip: self.private_ip,
            port: self.port,
        }
    }
}
