//! Outbound server messages.
//!
//! A [`ServerEvent`] knows its own wire name and how to render its
//! textual payload, so turning one into an [`Envelope`] is a single call.

use serde::{Deserialize, Serialize};

use crate::{
    DirectionChange, Envelope, EventKind, KickForceChange, PlayerCount, PlayerRecord, ProtocolError,
    TurnChange, TurnSnapshot,
};

/// Payload of `joined`, sent only to the player who just joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Joined {
    /// The joiner's own record.
    pub player: PlayerRecord,
    /// The full roster in turn order, the joiner included.
    pub players: Vec<PlayerRecord>,
    pub player_count: PlayerCount,
    /// Current shared turn state so a late joiner starts in sync.
    pub turn_state: TurnSnapshot,
}

/// Payload of `peer-joined` and `peer-left`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerUpdate {
    pub player: PlayerRecord,
    /// Roster size after the change.
    pub player_count: PlayerCount,
}

/// Payload of `roster-reply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterReply {
    pub players: Vec<PlayerRecord>,
    pub player_count: PlayerCount,
}

/// A message the server sends to a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// `joined`: reply to a successful join.
    Joined(Joined),
    /// `peer-joined`: someone else joined.
    PeerJoined(PeerUpdate),
    /// `peer-left`: someone else left or disconnected.
    PeerLeft(PeerUpdate),
    /// `turn-change`: rebroadcast of a turn change.
    TurnChange(TurnChange),
    /// `direction-change`: rebroadcast of a direction change.
    DirectionChange(DirectionChange),
    /// `kick-force-change`: rebroadcast of a kick force change.
    KickForceChange(KickForceChange),
    /// `roster-reply`: answer to a roster query.
    RosterReply(RosterReply),
    /// `<kind>-error`: a message was rejected. `name` is the reply's wire
    /// name; the payload is the human-readable `message`, not JSON.
    Error { name: &'static str, message: String },
}

impl ServerEvent {
    /// Builds the error reply for a rejected message of `kind`, or `None`
    /// if that kind has no error reply (see [`EventKind::error_name`]).
    ///
    /// The message is prefixed with the operation name so a client that
    /// logs raw payloads can tell which request failed.
    pub fn error(kind: EventKind, reason: impl std::fmt::Display) -> Option<Self> {
        let name = kind.error_name()?;
        Some(Self::Error {
            name,
            message: format!("{kind} failed: {reason}"),
        })
    }

    /// The wire name of this event.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Joined(_) => "joined",
            Self::PeerJoined(_) => "peer-joined",
            Self::PeerLeft(_) => "peer-left",
            Self::TurnChange(_) => EventKind::TurnChange.name(),
            Self::DirectionChange(_) => EventKind::DirectionChange.name(),
            Self::KickForceChange(_) => EventKind::KickForceChange.name(),
            Self::RosterReply(_) => "roster-reply",
            Self::Error { name, .. } => name,
        }
    }

    /// Renders the textual payload.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if a payload value can't be
    /// serialized.
    pub fn encode_data(&self) -> Result<String, ProtocolError> {
        let json = match self {
            Self::Joined(p) => serde_json::to_string(p),
            Self::PeerJoined(p) | Self::PeerLeft(p) => serde_json::to_string(p),
            Self::TurnChange(p) => serde_json::to_string(p),
            Self::DirectionChange(p) => serde_json::to_string(p),
            Self::KickForceChange(p) => serde_json::to_string(p),
            Self::RosterReply(p) => serde_json::to_string(p),
            Self::Error { message, .. } => return Ok(message.clone()),
        };
        json.map_err(ProtocolError::Encode)
    }

    /// Wraps this event in an envelope with the given sequence number.
    pub fn to_envelope(&self, seq: u64) -> Result<Envelope, ProtocolError> {
        Ok(Envelope::new(seq, self.event_name(), self.encode_data()?))
    }
}
