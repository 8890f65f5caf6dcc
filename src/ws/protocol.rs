//! WebSocket protocol message definitions
//! These are the wire types shared by the relay and the client session.
//!
//! Frames are JSON objects of the form `{"event": "...", "data": {...}}`.
//! Records are plain data; typed engine values are rebuilt from them through
//! the `TryFrom` conversions at the bottom of this file.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{Command, CommandClass, CommandEvent, InputState, Snapshot, Timestamp, WorldState};

/// Connection identifier assigned by the relay
pub type PeerId = Uuid;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMsg {
    /// A command press or release
    CommandInfo(CommandInfo),
    /// The sender's reconstructed state, published periodically
    Snapshot(SnapshotRecord),
    /// Chat text
    Message(ChatMessage),
}

impl ClientMsg {
    /// Server-side form of this message, tagged with the sender
    pub fn tagged(self, id: PeerId) -> ServerMsg {
        match self {
            ClientMsg::CommandInfo(info) => ServerMsg::CommandInfo(CommandInfo { id: Some(id), ..info }),
            ClientMsg::Snapshot(record) => ServerMsg::Snapshot(SnapshotRecord { id: Some(id), ..record }),
            ClientMsg::Message(message) => ServerMsg::Message(ChatMessage { id: Some(id), ..message }),
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Spawn data; without `id` it describes the receiving client
    Initial(InitialRecord),
    CommandInfo(CommandInfo),
    Snapshot(SnapshotRecord),
    Message(ChatMessage),
    /// A peer disconnected
    Terminate(Terminate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialRecord {
    pub time: Timestamp,
    pub x: f64,
    pub y: f64,
    /// Degrees
    pub rotation: f64,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PeerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Command name, e.g. `MOVE_FORWARD`
    pub command: String,
    pub time: Timestamp,
    /// Command class name, e.g. `move`
    #[serde(rename = "type")]
    pub class: String,
    /// `true` on press, `false` on release
    pub state: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PeerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldStateRecord {
    pub x: f64,
    pub y: f64,
    pub orientation: f64,
}

/// Held flags keyed by command name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct InputStateRecord {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub rotate_cw: bool,
    pub rotate_ccw: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub world_state: WorldStateRecord,
    #[serde(default)]
    pub input_state: InputStateRecord,
    pub time: Timestamp,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PeerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    pub time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PeerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminate {
    pub id: PeerId,
    pub time: Timestamp,
}

/// Rejections at the network boundary
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown command class: {0}")]
    UnknownClass(String),

    #[error("Command {command} does not belong to class {class}")]
    ClassMismatch { command: String, class: String },

    #[error("Non-finite value in field {0}")]
    NonFinite(&'static str),
}

fn finite(value: f64, field: &'static str) -> Result<f64, ProtocolError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProtocolError::NonFinite(field))
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&CommandEvent> for CommandInfo {
    fn from(event: &CommandEvent) -> Self {
        Self {
            command: event.command.as_str().to_string(),
            time: event.time,
            class: event.class.as_str().to_string(),
            state: event.active,
            id: None,
        }
    }
}

impl TryFrom<&CommandInfo> for CommandEvent {
    type Error = ProtocolError;

    fn try_from(info: &CommandInfo) -> Result<Self, Self::Error> {
        let command = Command::from_name(&info.command)
            .ok_or_else(|| ProtocolError::UnknownCommand(info.command.clone()))?;
        let class = CommandClass::from_name(&info.class)
            .ok_or_else(|| ProtocolError::UnknownClass(info.class.clone()))?;

        if command.class() != class {
            return Err(ProtocolError::ClassMismatch {
                command: info.command.clone(),
                class: info.class.clone(),
            });
        }

        Ok(CommandEvent::new(command, info.time, info.state))
    }
}

impl From<InputState> for InputStateRecord {
    fn from(input: InputState) -> Self {
        Self {
            move_forward: input.is_held(Command::MoveForward),
            move_backward: input.is_held(Command::MoveBackward),
            move_left: input.is_held(Command::MoveLeft),
            move_right: input.is_held(Command::MoveRight),
            rotate_cw: input.is_held(Command::RotateCw),
            rotate_ccw: input.is_held(Command::RotateCcw),
        }
    }
}

impl From<InputStateRecord> for InputState {
    fn from(record: InputStateRecord) -> Self {
        InputState::IDLE
            .with(Command::MoveForward, record.move_forward)
            .with(Command::MoveBackward, record.move_backward)
            .with(Command::MoveLeft, record.move_left)
            .with(Command::MoveRight, record.move_right)
            .with(Command::RotateCw, record.rotate_cw)
            .with(Command::RotateCcw, record.rotate_ccw)
    }
}

impl From<WorldState> for WorldStateRecord {
    fn from(world: WorldState) -> Self {
        Self {
            x: world.x,
            y: world.y,
            orientation: world.orientation,
        }
    }
}

impl TryFrom<WorldStateRecord> for WorldState {
    type Error = ProtocolError;

    fn try_from(record: WorldStateRecord) -> Result<Self, Self::Error> {
        Ok(WorldState::new(
            finite(record.x, "worldState.x")?,
            finite(record.y, "worldState.y")?,
            finite(record.orientation, "worldState.orientation")?,
        ))
    }
}

impl From<&Snapshot> for SnapshotRecord {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            world_state: snapshot.world.into(),
            input_state: snapshot.input.into(),
            time: snapshot.time,
            color: snapshot.color.clone(),
            id: None,
        }
    }
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = ProtocolError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        Ok(Snapshot::new(
            record.world_state.try_into()?,
            record.input_state.into(),
            record.time,
            record.color,
        ))
    }
}

impl TryFrom<InitialRecord> for Snapshot {
    type Error = ProtocolError;

    fn try_from(record: InitialRecord) -> Result<Self, Self::Error> {
        let world = WorldState::new(
            finite(record.x, "x")?,
            finite(record.y, "y")?,
            finite(record.rotation, "rotation")?,
        );
        Ok(Snapshot::at_rest(world, record.time, record.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_info_wire_shape() {
        let msg = ClientMsg::CommandInfo(CommandInfo::from(&CommandEvent::press(Command::MoveForward, 1000)));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "commandInfo",
                "data": {"command": "MOVE_FORWARD", "time": 1000, "type": "move", "state": true}
            })
        );
    }

    #[test]
    fn snapshot_wire_shape() {
        let input = InputState::IDLE.with(Command::RotateCw, true);
        let snapshot = Snapshot::new(WorldState::new(1.5, -2.0, 90.0), input, 77, "hsl(3, 100%, 50%)");
        let id = Uuid::new_v4();
        let msg = ClientMsg::Snapshot(SnapshotRecord::from(&snapshot)).tagged(id);

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "snapshot");
        assert_eq!(value["data"]["worldState"]["orientation"], 90.0);
        assert_eq!(value["data"]["inputState"]["ROTATE_CW"], true);
        assert_eq!(value["data"]["inputState"]["MOVE_FORWARD"], false);
        assert_eq!(value["data"]["id"], id.to_string());

        let parsed: ServerMsg = serde_json::from_value(value).unwrap();
        let ServerMsg::Snapshot(record) = parsed else {
            panic!("expected snapshot");
        };
        assert_eq!(record.id, Some(id));
        let rebuilt = Snapshot::try_from(record).unwrap();
        assert_eq!(rebuilt.world, snapshot.world);
        assert_eq!(rebuilt.input, snapshot.input);
        assert_eq!(rebuilt.color, snapshot.color);
    }

    #[test]
    fn initial_without_id_omits_the_field() {
        let msg = ServerMsg::Initial(InitialRecord {
            time: 5,
            x: 10.0,
            y: 20.0,
            rotation: 0.0,
            color: "hsl(0, 100%, 50%)".to_string(),
            id: None,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value["data"].get("id").is_none());
        assert_eq!(value["event"], "initial");
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let info = CommandInfo {
            command: "MOVE_UP".to_string(),
            time: 1,
            class: "move".to_string(),
            state: true,
            id: None,
        };
        assert_eq!(
            CommandEvent::try_from(&info),
            Err(ProtocolError::UnknownCommand("MOVE_UP".to_string()))
        );

        let info = CommandInfo {
            command: "ROTATE_CW".to_string(),
            class: "fire".to_string(),
            ..info
        };
        assert_eq!(
            CommandEvent::try_from(&info),
            Err(ProtocolError::UnknownClass("fire".to_string()))
        );
    }

    #[test]
    fn partial_input_state_defaults_to_released() {
        let value = json!({
            "worldState": {"x": 0.0, "y": 0.0, "orientation": 0.0},
            "inputState": {"MOVE_FORWARD": true},
            "time": 9,
            "color": "red"
        });
        let record: SnapshotRecord = serde_json::from_value(value).unwrap();
        let snapshot = Snapshot::try_from(record).unwrap();
        assert!(snapshot.input.is_held(Command::MoveForward));
        assert!(!snapshot.input.is_held(Command::RotateCcw));
    }

    #[test]
    fn non_finite_positions_are_rejected() {
        let record = SnapshotRecord {
            world_state: WorldStateRecord {
                x: f64::NAN,
                y: 0.0,
                orientation: 0.0,
            },
            input_state: InputStateRecord::default(),
            time: 0,
            color: String::new(),
            id: None,
        };
        assert_eq!(
            Snapshot::try_from(record),
            Err(ProtocolError::NonFinite("worldState.x"))
        );
    }

    #[test]
    fn terminate_names_its_sender() {
        let id = Uuid::new_v4();
        let msg: ServerMsg = serde_json::from_value(json!({
            "event": "terminate",
            "data": {"id": id, "time": 12}
        }))
        .unwrap();
        assert_eq!(msg, ServerMsg::Terminate(Terminate { id, time: 12 }));
    }
}
