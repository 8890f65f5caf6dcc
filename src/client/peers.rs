//! Remote peers and their command logs

use std::collections::HashMap;

use crate::game::{CommandLog, Snapshot, Timestamp};
use crate::ws::protocol::PeerId;

/// Command logs of every known remote peer
#[derive(Debug, Default)]
pub struct PeerRegistry {
    logs: HashMap<PeerId, CommandLog>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log for `id`, created empty on first reference
    pub fn log_mut(&mut self, id: PeerId) -> &mut CommandLog {
        self.logs.entry(id).or_default()
    }

    pub fn get(&self, id: &PeerId) -> Option<&CommandLog> {
        self.logs.get(id)
    }

    /// Starts a fresh log for `id` from its spawn snapshot
    pub fn introduce(&mut self, id: PeerId, initial: Snapshot) {
        self.logs.insert(id, CommandLog::with_snapshot(initial));
    }

    pub fn remove(&mut self, id: &PeerId) -> Option<CommandLog> {
        self.logs.remove(id)
    }

    pub fn clear(&mut self) {
        self.logs.clear();
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// State of every peer at `time`; peers without a usable snapshot are skipped
    pub fn reconstruct_all(&self, time: Timestamp) -> Vec<(PeerId, Snapshot)> {
        self.logs
            .iter()
            .filter_map(|(id, log)| log.reconstruct(time).map(|snapshot| (*id, snapshot)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Command, CommandEvent, WorldState};
    use uuid::Uuid;

    #[test]
    fn logs_are_created_lazily() {
        let mut peers = PeerRegistry::new();
        let id = Uuid::new_v4();
        peers
            .log_mut(id)
            .insert_command(CommandEvent::press(Command::MoveForward, 10));

        assert_eq!(peers.len(), 1);
        // Commands alone cannot be replayed
        assert!(peers.reconstruct_all(100).is_empty());

        peers
            .log_mut(id)
            .insert_snapshot(Snapshot::at_rest(WorldState::default(), 0, "white"));
        let states = peers.reconstruct_all(100);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].0, id);
    }

    #[test]
    fn removed_peers_are_gone() {
        let mut peers = PeerRegistry::new();
        let id = Uuid::new_v4();
        peers.introduce(id, Snapshot::at_rest(WorldState::default(), 0, "white"));
        assert!(peers.remove(&id).is_some());
        assert!(peers.get(&id).is_none());
        assert!(peers.is_empty());
    }
}
