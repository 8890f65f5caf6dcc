//! Directional commands and the events that carry them

use serde::{Deserialize, Serialize};

/// Milliseconds on the shared clock
pub type Timestamp = u64;

/// Directional commands a ship can be given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    MoveForward,
    MoveBackward,
    /// Strafe left. Tracked but produces no motion.
    MoveLeft,
    /// Strafe right. Tracked but produces no motion.
    MoveRight,
    RotateCw,
    RotateCcw,
}

impl Command {
    pub const COUNT: usize = 6;

    pub const ALL: [Command; Command::COUNT] = [
        Command::MoveForward,
        Command::MoveBackward,
        Command::MoveLeft,
        Command::MoveRight,
        Command::RotateCw,
        Command::RotateCcw,
    ];

    /// Slot of this command in fixed-size per-command tables
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn class(self) -> CommandClass {
        match self {
            Command::MoveForward
            | Command::MoveBackward
            | Command::MoveLeft
            | Command::MoveRight
            | Command::RotateCw
            | Command::RotateCcw => CommandClass::Move,
        }
    }

    /// Name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Command::MoveForward => "MOVE_FORWARD",
            Command::MoveBackward => "MOVE_BACKWARD",
            Command::MoveLeft => "MOVE_LEFT",
            Command::MoveRight => "MOVE_RIGHT",
            Command::RotateCw => "ROTATE_CW",
            Command::RotateCcw => "ROTATE_CCW",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Keyboard binding: WASD, with A/D rotating
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" => Some(Command::MoveForward),
            "a" => Some(Command::RotateCcw),
            "s" => Some(Command::MoveBackward),
            "d" => Some(Command::RotateCw),
            _ => None,
        }
    }
}

/// Grouping of commands that share integration treatment.
///
/// Each class gets its own bucket in a [`CommandLog`](super::CommandLog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandClass {
    /// Continuous commands, active between press and release
    Move,
}

impl CommandClass {
    pub const COUNT: usize = 1;

    pub const ALL: [CommandClass; CommandClass::COUNT] = [CommandClass::Move];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandClass::Move => "move",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

/// A single press or release of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEvent {
    pub command: Command,
    pub time: Timestamp,
    pub class: CommandClass,
    /// `true` for press, `false` for release
    pub active: bool,
}

impl CommandEvent {
    pub fn new(command: Command, time: Timestamp, active: bool) -> Self {
        Self {
            command,
            time,
            class: command.class(),
            active,
        }
    }

    pub fn press(command: Command, time: Timestamp) -> Self {
        Self::new(command, time, true)
    }

    pub fn release(command: Command, time: Timestamp) -> Self {
        Self::new(command, time, false)
    }
}
