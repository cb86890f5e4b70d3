mod broadcast;
mod room;
mod room_registry;

pub use broadcast::*;
pub use room::*;
pub use room_registry::*;
