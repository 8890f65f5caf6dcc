//! Room membership and per-room broadcast channels

use std::collections::HashSet;

use tokio::sync::broadcast;

use crate::ws::protocol::{PeerId, ServerMsg};

/// Default cap on peers sharing a room
pub const MAX_ROOM_SIZE: usize = 15;

/// Buffered messages per room before slow receivers start lagging
const ROOM_CHANNEL_CAPACITY: usize = 256;

pub type RoomId = u64;

/// A message fanned out to a room, remembering who sent it
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: PeerId,
    pub msg: ServerMsg,
}

struct Room {
    id: RoomId,
    members: HashSet<PeerId>,
    tx: broadcast::Sender<Envelope>,
}

/// Rooms in creation order. New peers join the first room with space.
pub struct RoomTable {
    capacity: usize,
    rooms: Vec<Room>,
    next_id: RoomId,
}

impl RoomTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            rooms: Vec::new(),
            next_id: 0,
        }
    }

    /// Places `peer` and returns its room with that room's channel
    pub fn assign(&mut self, peer: PeerId) -> (RoomId, broadcast::Sender<Envelope>) {
        let capacity = self.capacity;
        let index = match self.rooms.iter().position(|r| r.members.len() < capacity) {
            Some(index) => index,
            None => {
                let (tx, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
                self.rooms.push(Room {
                    id: self.next_id,
                    members: HashSet::new(),
                    tx,
                });
                self.next_id += 1;
                self.rooms.len() - 1
            }
        };

        let room = &mut self.rooms[index];
        room.members.insert(peer);
        (room.id, room.tx.clone())
    }

    /// Removes `peer`; empty rooms are dropped. Returns the room's channel.
    pub fn leave(&mut self, peer: &PeerId) -> Option<(RoomId, broadcast::Sender<Envelope>)> {
        let index = self.rooms.iter().position(|r| r.members.contains(peer))?;
        let room = &mut self.rooms[index];
        room.members.remove(peer);
        let left = (room.id, room.tx.clone());

        if room.members.is_empty() {
            self.rooms.remove(index);
        }
        Some(left)
    }

    pub fn sender(&self, room: RoomId) -> Option<broadcast::Sender<Envelope>> {
        self.rooms.iter().find(|r| r.id == room).map(|r| r.tx.clone())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn peer_count(&self) -> usize {
        self.rooms.iter().map(|r| r.members.len()).sum()
    }
}

impl Default for RoomTable {
    fn default() -> Self {
        Self::new(MAX_ROOM_SIZE)
    }
}
