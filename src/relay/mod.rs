//! Room-scoped message relay

pub mod rooms;
pub mod service;
pub mod spawn;

pub use rooms::{Envelope, RoomId, RoomTable, MAX_ROOM_SIZE};
pub use service::{Connection, RelayService};
pub use spawn::Spawn;
