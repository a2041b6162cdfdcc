//! Core protocol types for Pitchside's wire format.
//!
//! This module defines the pieces every message is built from: the outer
//! [`Envelope`] frame, the [`EventKind`] catalog of inbound message names,
//! and the records that appear inside payloads ([`PlayerRecord`],
//! [`PlayerCount`], [`TurnSnapshot`]).
//!
//! Field names are camelCase on the wire because the clients are
//! loosely-typed scripts that already speak this contract.

use std::fmt;
use std::str::FromStr;

use pitchside_transport::ConnectionId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::ProtocolError;

/// Username given to a player whose join request carries a blank name.
pub const DEFAULT_USERNAME: &str = "Guest";

// ---------------------------------------------------------------------------
// Envelope: the top-level wire format
// ---------------------------------------------------------------------------

/// The top-level frame. Every WebSocket message is one Envelope.
///
/// ```text
/// ┌──────────────────────────────────────────┐
/// │ seq: 3                                   │  ← per-connection counter
/// │ event: "turn-change"                     │  ← message name
/// │ data: "{\"playerTurn\":2}"               │  ← opaque textual payload
/// └──────────────────────────────────────────┘
/// ```
///
/// `data` is deliberately a `String`, not a nested JSON value: the event
/// channel carries serialized text, and each message kind decodes it into
/// its own typed record (see [`ClientEvent::decode`](crate::ClientEvent::decode)).
/// That keeps a bad payload a per-message error instead of a frame error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Sequence number. The server numbers its outbound envelopes per
    /// connection starting at 1; clients may omit it (defaults to 0).
    #[serde(default)]
    pub seq: u64,

    /// The message name, e.g. `"join"` or `"peer-left"`.
    pub event: String,

    /// The textual payload. Defaults to `""` for messages that carry none
    /// (`roster-query`, `leave`).
    #[serde(default)]
    pub data: String,
}

impl Envelope {
    /// Builds an envelope from its parts.
    pub fn new(seq: u64, event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            seq,
            event: event.into(),
            data: data.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventKind: inbound message catalog
// ---------------------------------------------------------------------------

/// The inbound message kinds a client may send.
///
/// The kinds whose payload is decoded have a dedicated error reply
/// (`<name>-error`) used when a message of that kind is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `join`: register this connection as a player.
    Join,
    /// `leave`: explicit departure; the connection is closed afterwards.
    Leave,
    /// `turn-change`: set whose turn it is.
    TurnChange,
    /// `direction-change`: set the facing direction.
    DirectionChange,
    /// `kick-force-change`: set the kick force.
    KickForceChange,
    /// `roster-query`: ask for the current roster.
    RosterQuery,
}

impl EventKind {
    /// Every inbound kind, in catalog order.
    pub const ALL: [EventKind; 6] = [
        EventKind::Join,
        EventKind::Leave,
        EventKind::TurnChange,
        EventKind::DirectionChange,
        EventKind::KickForceChange,
        EventKind::RosterQuery,
    ];

    /// Looks up a kind by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The wire name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::TurnChange => "turn-change",
            Self::DirectionChange => "direction-change",
            Self::KickForceChange => "kick-force-change",
            Self::RosterQuery => "roster-query",
        }
    }

    /// The wire name of the error reply for this kind.
    ///
    /// `None` for `leave` and `roster-query`: they carry no payload, so
    /// nothing about them can be rejected.
    pub fn error_name(self) -> Option<&'static str> {
        match self {
            Self::Join => Some("join-error"),
            Self::TurnChange => Some("turn-change-error"),
            Self::DirectionChange => Some("direction-change-error"),
            Self::KickForceChange => Some("kick-force-change-error"),
            Self::Leave | Self::RosterQuery => None,
        }
    }

    /// Returns `true` for the kinds that mutate the shared turn state.
    pub fn is_state_change(self) -> bool {
        matches!(
            self,
            Self::TurnChange | Self::DirectionChange | Self::KickForceChange
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = ProtocolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::from_name(name)
            .ok_or_else(|| ProtocolError::UnknownEvent(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Payload records
// ---------------------------------------------------------------------------

/// A player as it appears in `joined`, `peer-joined`, `peer-left` and
/// `roster-reply` payloads.
///
/// `#[serde(rename_all = "camelCase")]` turns `turn_order` into
/// `"turnOrder"` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// The connection id rendered as text, e.g. `"conn-7"`.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Zero-based position in the turn order.
    pub turn_order: usize,
}

/// The number of players in the roster.
///
/// Transmitted as a JSON *string* (`"3"`, not `3`) because existing clients
/// read it as text. Serialize and Deserialize are implemented by hand so
/// Rust code can keep treating it as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlayerCount(pub usize);

impl Serialize for PlayerCount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PlayerCount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let text = String::deserialize(d)?;
        text.parse()
            .map(PlayerCount)
            .map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for PlayerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The current value of every shared turn-state field.
///
/// Values are opaque: the coordinator stores and forwards whatever the
/// clients sent. `None` (serialized as `null`) means the field has never
/// been set since the process started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSnapshot {
    pub player_turn: Option<Value>,
    pub player_direction: Option<Value>,
    pub kick_force: Option<Value>,
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive an outbound message.
///
/// The router pairs every outbound message with a `Recipient`. `All` and
/// `AllExcept` only ever reach connections that are on the roster when
/// the message is dispatched; a connection that never joined hears
/// nothing but direct replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every joined player. Used for `peer-left`, whose subject is
    /// already off the roster.
    All,

    /// One specific connection, joined or not.
    Player(ConnectionId),

    /// Every joined player EXCEPT the given connection.
    /// Used to fan a state change out to everyone but its sender.
    AllExcept(ConnectionId),
}

// =========================================================================
// Tests
// =========================================================================
