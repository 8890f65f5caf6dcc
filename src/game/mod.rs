//! Dead-reckoning engine: commands, kinematics and the per-ship command log

pub mod command;
pub mod command_log;
pub mod input;
pub mod physics;
pub mod snapshot;
pub mod world;

pub use command::{Command, CommandClass, CommandEvent, Timestamp};
pub use command_log::{CommandLog, MAX_SNAPSHOTS, MAX_SNAPSHOT_OVERFLOW};
pub use input::InputState;
pub use physics::{LocalDelta, Velocities, MOVE_SPEED, ROTATION_SPEED};
pub use snapshot::Snapshot;
pub use world::{normalize_orientation, WorldState};
