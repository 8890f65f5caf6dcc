//! Starfield - dead-reckoning multiplayer ships
//!
//! Every client keeps a [`game::CommandLog`] per ship: the commands it was
//! given and occasional snapshots of where it was. Any ship's position at any
//! instant is rebuilt by replaying that log, so peers only exchange key
//! presses and the odd snapshot instead of a stream of positions.
//!
//! - [`game`]: kinematics, command log and replay
//! - [`client`]: per-connection client session (local ship, peers, chat, camera)
//! - [`ws::protocol`]: wire messages shared by client and relay
//! - [`relay`]: room assignment and fan-out, served by the `starfield-relay` binary

pub mod app;
pub mod client;
pub mod config;
pub mod game;
pub mod http;
pub mod relay;
pub mod util;
pub mod ws;
