//! Held-command state

use super::command::{Command, CommandEvent};

/// Which commands are currently held.
///
/// A plain value: applying an event returns a new state and leaves the old
/// one untouched, so replaying history never depends on who else holds a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    held: [bool; Command::COUNT],
}

impl InputState {
    /// Nothing held
    pub const IDLE: InputState = InputState {
        held: [false; Command::COUNT],
    };

    pub fn is_held(&self, command: Command) -> bool {
        self.held[command.index()]
    }

    /// Returns a copy with `command` set to `held`
    pub fn with(mut self, command: Command, held: bool) -> Self {
        self.held[command.index()] = held;
        self
    }

    /// Folds one command event into the state
    pub fn with_command(self, event: &CommandEvent) -> Self {
        self.with(event.command, event.active)
    }

    /// Held flags in [`Command::ALL`] order
    pub fn held(&self) -> impl Iterator<Item = (Command, bool)> + '_ {
        Command::ALL.into_iter().map(|c| (c, self.held[c.index()]))
    }

    /// 1.0 if held, 0.0 otherwise
    pub(crate) fn factor(&self, command: Command) -> f64 {
        if self.is_held(command) {
            1.0
        } else {
            0.0
        }
    }
}
