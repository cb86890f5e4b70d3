mod connection;
mod peer;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use peer::{PeerRecord, Port};
pub use room::{InvalidRoomId, RoomId};
pub use signaling::{AddressReport, PeerList};
