//! The roster entry for one joined connection.

use pitchside_protocol::PlayerRecord;
use pitchside_transport::ConnectionId;

/// A player in the roster.
///
/// Created when a join is accepted and dropped when its connection
/// leaves. Only the [`Registry`](crate::Registry) changes `turn_order`,
/// which is why the fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: ConnectionId,
    username: String,
    turn_order: usize,
}

impl Player {
    pub(crate) fn new(id: ConnectionId, username: String, turn_order: usize) -> Self {
        Self {
            id,
            username,
            turn_order,
        }
    }

    /// The owning connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Display name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Zero-based position in the turn order.
    pub fn turn_order(&self) -> usize {
        self.turn_order
    }

    pub(crate) fn set_turn_order(&mut self, turn_order: usize) {
        self.turn_order = turn_order;
    }

    /// The wire form of this player.
    pub fn to_record(&self) -> PlayerRecord {
        PlayerRecord {
            id: self.id.to_string(),
            username: self.username.clone(),
            turn_order: self.turn_order,
        }
    }
}
