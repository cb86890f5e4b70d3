mod connection_driver;
mod signaling_service;
mod ws_handler;

pub use connection_driver::*;
pub use signaling_service::*;
pub use ws_handler::*;
