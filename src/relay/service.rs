//! Relay service - room assignment and fan-out between peers
//!
//! The relay never simulates anything. It hands out spawn points, forwards
//! every peer message to the rest of the sender's room tagged with the
//! sender's id, and announces departures.

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::{debug, info, warn};

use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, PeerId, ServerMsg, Terminate};

use super::rooms::{Envelope, RoomId, RoomTable};
use super::spawn::Spawn;

/// One peer's end of its room channel
pub struct Connection {
    pub peer_id: PeerId,
    pub room: RoomId,
    /// Spawn data for this peer, to be sent to it first
    pub initial: ServerMsg,
    rx: broadcast::Receiver<Envelope>,
}

impl Connection {
    /// Next message from another member of the room
    pub async fn recv(&mut self) -> Result<ServerMsg, RecvError> {
        loop {
            let envelope = self.rx.recv().await?;
            if envelope.from != self.peer_id {
                return Ok(envelope.msg);
            }
        }
    }

    pub fn try_recv(&mut self) -> Result<ServerMsg, TryRecvError> {
        loop {
            let envelope = self.rx.try_recv()?;
            if envelope.from != self.peer_id {
                return Ok(envelope.msg);
            }
        }
    }
}

/// Relay service
pub struct RelayService {
    rooms: Mutex<RoomTable>,
    /// Map of peer -> current room
    peer_rooms: DashMap<PeerId, RoomId>,
    rng: Mutex<ChaCha8Rng>,
}

impl RelayService {
    pub fn new(max_room_size: usize) -> Self {
        Self::with_rng(max_room_size, ChaCha8Rng::seed_from_u64(rand::random()))
    }

    pub fn with_rng(max_room_size: usize, rng: ChaCha8Rng) -> Self {
        Self {
            rooms: Mutex::new(RoomTable::new(max_room_size)),
            peer_rooms: DashMap::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Admits a new peer: assigns a room, spawns it and tells the room
    pub fn connect(&self) -> Connection {
        let peer_id = PeerId::new_v4();
        let spawn = Spawn::random(&mut *self.rng.lock());
        let time = unix_millis();

        let (room, tx) = self.rooms.lock().assign(peer_id);
        let rx = tx.subscribe();
        self.peer_rooms.insert(peer_id, room);

        let announcement = ServerMsg::Initial(spawn.initial(time, Some(peer_id)));
        let _ = tx.send(Envelope {
            from: peer_id,
            msg: announcement,
        });

        info!(peer_id = %peer_id, room, "Peer connected");

        Connection {
            peer_id,
            room,
            initial: ServerMsg::Initial(spawn.initial(time, None)),
            rx,
        }
    }

    /// Forwards a peer's message to the rest of its room.
    /// Returns false if the peer is not connected.
    pub fn relay(&self, peer_id: PeerId, msg: ClientMsg) -> bool {
        let Some(room) = self.peer_rooms.get(&peer_id).map(|r| *r) else {
            warn!(peer_id = %peer_id, "Relay from unknown peer");
            return false;
        };
        let Some(tx) = self.rooms.lock().sender(room) else {
            return false;
        };

        let receivers = tx
            .send(Envelope {
                from: peer_id,
                msg: msg.tagged(peer_id),
            })
            .unwrap_or(0);
        debug!(peer_id = %peer_id, room, receivers, "Relayed message");
        true
    }

    /// Removes a peer and announces its departure to its room
    pub fn disconnect(&self, peer_id: PeerId) {
        self.peer_rooms.remove(&peer_id);

        let Some((room, tx)) = self.rooms.lock().leave(&peer_id) else {
            return;
        };

        let _ = tx.send(Envelope {
            from: peer_id,
            msg: ServerMsg::Terminate(Terminate {
                id: peer_id,
                time: unix_millis(),
            }),
        });

        info!(peer_id = %peer_id, room, "Peer disconnected");
    }

    pub fn room_count(&self) -> usize {
        self.rooms.lock().room_count()
    }

    pub fn peer_count(&self) -> usize {
        self.peer_rooms.len()
    }
}
