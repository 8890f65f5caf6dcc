//! Client-side state: the local ship, remote peers, chat and camera

pub mod camera;
pub mod chat;
pub mod peers;
pub mod session;

pub use camera::Camera;
pub use chat::MessageLog;
pub use peers::PeerRegistry;
pub use session::{ClientSession, Frame, COMMANDS_PER_SNAPSHOT};
