//! Client session: everything one connected client knows about the world
//!
//! Network events, local input and the frame loop all run on one logical
//! thread and go through `&mut ClientSession`. The local log is written only
//! by local input; a peer's log only by messages carrying that peer's id.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::game::{Command, CommandEvent, CommandLog, Snapshot, Timestamp};
use crate::ws::protocol::{
    ChatMessage, ClientMsg, CommandInfo, InitialRecord, PeerId, ServerMsg, SnapshotRecord,
};

use super::camera::Camera;
use super::chat::MessageLog;
use super::peers::PeerRegistry;

/// A local snapshot is published after this many commands
pub const COMMANDS_PER_SNAPSHOT: u32 = 10;
/// How long the controls hint stays up after spawning
pub const TUTORIAL_DURATION_MS: Timestamp = 20_000;

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub time: Timestamp,
    pub local: Snapshot,
    /// Peers with a known state; peers without a snapshot yet are left out
    pub peers: Vec<(PeerId, Snapshot)>,
    pub camera: Camera,
    /// Visible chat lines per speaker, `None` being the local player
    pub chat: Vec<(Option<PeerId>, Vec<String>)>,
    pub show_tutorial: bool,
    /// Local snapshot to publish, if one was due
    pub outbound: Option<ClientMsg>,
}

#[derive(Debug, Default)]
pub struct ClientSession {
    local: Option<CommandLog>,
    spawned_at: Timestamp,
    peers: PeerRegistry,
    own_chat: MessageLog,
    peer_chat: HashMap<PeerId, MessageLog>,
    camera: Camera,
    commands_since_snapshot: u32,
    snapshot_due: bool,
}

impl ClientSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one inbound message. `now` is the local receive time.
    pub fn handle(&mut self, msg: ServerMsg, now: Timestamp) {
        match msg {
            ServerMsg::Initial(record) => self.on_initial(record, now),
            ServerMsg::CommandInfo(info) => self.on_command_info(info),
            ServerMsg::Snapshot(record) => self.on_snapshot(record),
            ServerMsg::Message(message) => self.on_message(message, now),
            ServerMsg::Terminate(terminate) => {
                self.peers.remove(&terminate.id);
                self.peer_chat.remove(&terminate.id);
                debug!(peer_id = %terminate.id, "Peer left");
            }
        }
    }

    /// Connection lost: forget every peer
    pub fn disconnect(&mut self) {
        self.peers.clear();
        self.peer_chat.clear();
        self.snapshot_due = false;
        self.commands_since_snapshot = 0;
        info!("Disconnected, peer state cleared");
    }

    /// Records a local press or release and returns the message announcing it.
    /// Ignored until the server has spawned us.
    pub fn input(&mut self, command: Command, pressed: bool, now: Timestamp) -> Option<ClientMsg> {
        let log = self.local.as_mut()?;
        let event = CommandEvent::new(command, now, pressed);
        log.insert_command(event);

        self.commands_since_snapshot += 1;
        if self.commands_since_snapshot >= COMMANDS_PER_SNAPSHOT {
            self.commands_since_snapshot = 0;
            self.snapshot_due = true;
        }

        Some(ClientMsg::CommandInfo(CommandInfo::from(&event)))
    }

    /// [`input`](Self::input) through the keyboard bindings
    pub fn key(&mut self, key: &str, pressed: bool, now: Timestamp) -> Option<ClientMsg> {
        Command::from_key(key).and_then(|command| self.input(command, pressed, now))
    }

    /// Posts a chat line from the local player
    pub fn say(&mut self, text: &str, now: Timestamp) -> Option<ClientMsg> {
        if text.is_empty() {
            return None;
        }
        self.own_chat.insert(text, now);
        Some(ClientMsg::Message(ChatMessage {
            message: text.to_string(),
            time: now,
            id: None,
        }))
    }

    /// Builds the frame at `now`. `None` until the local ship can be placed.
    pub fn frame(&mut self, now: Timestamp) -> Option<Frame> {
        let local = self.local.as_ref()?.reconstruct(now)?;

        self.camera.follow(&local.world);
        let peers = self.peers.reconstruct_all(now);

        let mut chat = Vec::new();
        let own_lines = self.own_chat.visible(now);
        if !own_lines.is_empty() {
            chat.push((None, own_lines));
        }
        for (id, log) in self.peer_chat.iter_mut() {
            let lines = log.visible(now);
            if !lines.is_empty() {
                chat.push((Some(*id), lines));
            }
        }

        let outbound = if self.snapshot_due {
            self.snapshot_due = false;
            let record = SnapshotRecord::from(&local);
            if let Some(log) = self.local.as_mut() {
                log.insert_snapshot(local.clone());
            }
            Some(ClientMsg::Snapshot(record))
        } else {
            None
        };

        Some(Frame {
            time: now,
            local,
            peers,
            camera: self.camera,
            chat,
            show_tutorial: now.saturating_sub(self.spawned_at) < TUTORIAL_DURATION_MS,
            outbound,
        })
    }

    pub fn local_log(&self) -> Option<&CommandLog> {
        self.local.as_ref()
    }

    pub fn peers(&self) -> &PeerRegistry {
        &self.peers
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn snapshot_due(&self) -> bool {
        self.snapshot_due
    }

    fn on_initial(&mut self, record: InitialRecord, now: Timestamp) {
        let id = record.id;
        let snapshot = match Snapshot::try_from(record) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Rejected initial record");
                return;
            }
        };

        match id {
            Some(id) => {
                self.peers.introduce(id, snapshot);
                // The newcomer needs our state to start drawing us
                self.snapshot_due = true;
                debug!(peer_id = %id, "Peer joined");
            }
            None => {
                info!(x = snapshot.world.x, y = snapshot.world.y, "Spawned");
                self.local = Some(CommandLog::with_snapshot(snapshot));
                self.spawned_at = now;
            }
        }
    }

    fn on_command_info(&mut self, info: CommandInfo) {
        let Some(id) = info.id else {
            debug!("Command without sender, ignoring");
            return;
        };
        match CommandEvent::try_from(&info) {
            Ok(event) => self.peers.log_mut(id).insert_command(event),
            Err(e) => debug!(peer_id = %id, error = %e, "Ignoring command"),
        }
    }

    fn on_snapshot(&mut self, record: SnapshotRecord) {
        let Some(id) = record.id else {
            debug!("Snapshot without sender, ignoring");
            return;
        };
        match Snapshot::try_from(record) {
            Ok(snapshot) => self.peers.log_mut(id).insert_snapshot(snapshot),
            Err(e) => warn!(peer_id = %id, error = %e, "Rejected snapshot"),
        }
    }

    fn on_message(&mut self, message: ChatMessage, now: Timestamp) {
        let Some(id) = message.id else {
            return;
        };
        // Stamped on receipt so fading follows the local clock
        self.peer_chat
            .entry(id)
            .or_default()
            .insert(message.message, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CommandClass, WorldState, MOVE_SPEED};
    use crate::ws::protocol::Terminate;
    use uuid::Uuid;

    fn initial(id: Option<PeerId>, time: Timestamp, x: f64, y: f64) -> ServerMsg {
        ServerMsg::Initial(InitialRecord {
            time,
            x,
            y,
            rotation: 0.0,
            color: "hsl(200, 100%, 50%)".to_string(),
            id,
        })
    }

    fn command(id: PeerId, command: Command, time: Timestamp, state: bool) -> ServerMsg {
        let mut info = CommandInfo::from(&CommandEvent::new(command, time, state));
        info.id = Some(id);
        ServerMsg::CommandInfo(info)
    }

    fn spawned() -> ClientSession {
        let mut session = ClientSession::new();
        session.handle(initial(None, 0, 100.0, 100.0), 0);
        session
    }

    #[test]
    fn peer_moves_forward_for_one_second() {
        let mut session = spawned();
        let peer = Uuid::new_v4();
        session.handle(initial(Some(peer), 0, 0.0, 0.0), 0);
        session.handle(command(peer, Command::MoveForward, 1000, true), 1000);
        session.handle(command(peer, Command::MoveForward, 2000, false), 2000);

        let frame = session.frame(2000).unwrap();
        let (id, state) = &frame.peers[0];
        assert_eq!(*id, peer);
        assert_eq!(state.world.x, 0.0);
        assert_eq!(state.world.y, -MOVE_SPEED);
        assert_eq!(state.world.orientation, 0.0);
    }

    #[test]
    fn new_peer_triggers_a_local_snapshot() {
        let mut session = spawned();
        assert!(!session.snapshot_due());

        session.handle(initial(Some(Uuid::new_v4()), 50, 0.0, 0.0), 50);
        assert!(session.snapshot_due());

        let frame = session.frame(100).unwrap();
        let Some(ClientMsg::Snapshot(record)) = frame.outbound else {
            panic!("expected outbound snapshot");
        };
        assert_eq!(record.time, 100);
        assert_eq!(record.world_state.x, 100.0);
        assert_eq!(session.local_log().unwrap().snapshots().len(), 2);

        assert!(session.frame(150).unwrap().outbound.is_none());
    }

    #[test]
    fn every_tenth_command_publishes_a_snapshot() {
        let mut session = spawned();
        for n in 0..COMMANDS_PER_SNAPSHOT as u64 - 1 {
            let msg = session.key("w", n % 2 == 0, 10 + n).unwrap();
            assert!(matches!(msg, ClientMsg::CommandInfo(_)));
        }
        assert!(!session.snapshot_due());

        session.input(Command::RotateCw, true, 100);
        assert!(session.snapshot_due());
        assert_eq!(
            session.local_log().unwrap().commands(CommandClass::Move).len(),
            COMMANDS_PER_SNAPSHOT as usize
        );
    }

    #[test]
    fn input_before_spawn_is_ignored() {
        let mut session = ClientSession::new();
        assert!(session.input(Command::MoveForward, true, 5).is_none());
        assert!(session.frame(10).is_none());
        assert!(session.key("x", true, 5).is_none());
    }

    #[test]
    fn unknown_commands_are_dropped() {
        let mut session = spawned();
        let peer = Uuid::new_v4();
        session.handle(
            ServerMsg::CommandInfo(CommandInfo {
                command: "MOVE_SIDEWAYS".to_string(),
                time: 10,
                class: "move".to_string(),
                state: true,
                id: Some(peer),
            }),
            10,
        );
        assert!(session.peers().get(&peer).is_none());
    }

    #[test]
    fn peers_without_snapshots_are_not_drawn() {
        let mut session = spawned();
        let peer = Uuid::new_v4();
        session.handle(command(peer, Command::RotateCw, 10, true), 10);
        assert_eq!(session.peers().len(), 1);
        assert!(session.frame(20).unwrap().peers.is_empty());

        let mut record = SnapshotRecord::from(&Snapshot::at_rest(WorldState::new(5.0, 5.0, 0.0), 5, "red"));
        record.id = Some(peer);
        session.handle(ServerMsg::Snapshot(record), 20);

        let frame = session.frame(30).unwrap();
        assert_eq!(frame.peers.len(), 1);
        assert!(frame.peers[0].1.world.orientation > 0.0);
    }

    #[test]
    fn terminate_and_disconnect_forget_peers() {
        let mut session = spawned();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        session.handle(initial(Some(a), 0, 0.0, 0.0), 0);
        session.handle(initial(Some(b), 0, 0.0, 0.0), 0);

        session.handle(ServerMsg::Terminate(Terminate { id: a, time: 10 }), 10);
        assert!(session.peers().get(&a).is_none());
        assert!(session.peers().get(&b).is_some());

        session.disconnect();
        assert!(session.peers().is_empty());
        assert!(!session.snapshot_due());
        assert!(session.local_log().is_some());
    }

    #[test]
    fn chat_lines_fade() {
        let mut session = spawned();
        let peer = Uuid::new_v4();
        session.handle(
            ServerMsg::Message(ChatMessage {
                message: "hi".to_string(),
                time: 0,
                id: Some(peer),
            }),
            1000,
        );
        assert!(session.say("", 1000).is_none());
        assert!(session.say("hello", 1000).is_some());

        let frame = session.frame(1500).unwrap();
        assert_eq!(frame.chat.len(), 2);
        assert!(frame.chat.contains(&(Some(peer), vec!["hi".to_string()])));
        assert!(frame.chat.contains(&(None, vec!["hello".to_string()])));

        assert!(session.frame(6001).unwrap().chat.is_empty());
    }

    #[test]
    fn tutorial_shows_after_spawn_only() {
        let mut session = spawned();
        assert!(session.frame(1).unwrap().show_tutorial);
        assert!(!session.frame(TUTORIAL_DURATION_MS).unwrap().show_tutorial);
    }

    #[test]
    fn camera_follows_local_ship() {
        let mut session = spawned();
        session.frame(10).unwrap();
        let camera = *session.camera();
        assert!(camera.x > 0.0 && camera.x < 100.0);
    }
}
