//! Per-player chat history with fading

use crate::game::command_log::insert_sorted_from_back;
use crate::game::Timestamp;

/// Messages stay visible for this long
pub const MESSAGE_DURATION_MS: Timestamp = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub text: String,
    pub time: Timestamp,
}

/// Time-ordered chat lines of one player
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    lines: Vec<ChatLine>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: impl Into<String>, time: Timestamp) {
        let line = ChatLine {
            text: text.into(),
            time,
        };
        insert_sorted_from_back(&mut self.lines, line, |l| l.time);
    }

    /// Lines still visible at `now`, oldest first. Expired lines are dropped.
    pub fn visible(&mut self, now: Timestamp) -> Vec<String> {
        let expired = self
            .lines
            .iter()
            .rposition(|l| l.time + MESSAGE_DURATION_MS < now)
            .map_or(0, |i| i + 1);
        self.lines.drain(..expired);
        self.lines.iter().map(|l| l.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
