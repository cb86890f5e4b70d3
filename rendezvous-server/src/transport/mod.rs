mod connection_handle;
mod transport_event;
mod ws_connection;

pub use connection_handle::*;
pub use transport_event::*;
pub use ws_connection::*;
