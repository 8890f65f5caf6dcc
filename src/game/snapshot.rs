//! Snapshots: known ship state at an instant

use super::command::{CommandClass, Timestamp};
use super::input::InputState;
use super::world::WorldState;

/// Everything needed to render a ship at or after `time`
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub world: WorldState,
    pub input: InputState,
    pub time: Timestamp,
    /// CSS color string, e.g. `hsl(210, 100%, 50%)`
    pub color: String,
    /// Absolute index of the first command at or after `time`, per class.
    /// Filled in by the log on insertion.
    pub(crate) bucket_indices: [usize; CommandClass::COUNT],
}

impl Snapshot {
    pub fn new(world: WorldState, input: InputState, time: Timestamp, color: impl Into<String>) -> Self {
        Self {
            world,
            input,
            time,
            color: color.into(),
            bucket_indices: [0; CommandClass::COUNT],
        }
    }

    /// Snapshot of a ship at rest with nothing held
    pub fn at_rest(world: WorldState, time: Timestamp, color: impl Into<String>) -> Self {
        Self::new(world, InputState::IDLE, time, color)
    }

    pub fn bucket_index(&self, class: CommandClass) -> usize {
        self.bucket_indices[class.index()]
    }
}
