//! The shared turn state.

use pitchside_protocol::TurnSnapshot;
use serde_json::Value;

/// The single current value of each shared per-turn field.
///
/// Values are stored as received and never interpreted. A field is
/// `None` until the first change for it is accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnState {
    player_turn: Option<Value>,
    player_direction: Option<Value>,
    kick_force: Option<Value>,
}

impl TurnState {
    pub fn set_player_turn(&mut self, value: Value) {
        self.player_turn = Some(value);
    }

    pub fn set_player_direction(&mut self, value: Value) {
        self.player_direction = Some(value);
    }

    pub fn set_kick_force(&mut self, value: Value) {
        self.kick_force = Some(value);
    }

    pub fn player_turn(&self) -> Option<&Value> {
        self.player_turn.as_ref()
    }

    pub fn player_direction(&self) -> Option<&Value> {
        self.player_direction.as_ref()
    }

    pub fn kick_force(&self) -> Option<&Value> {
        self.kick_force.as_ref()
    }

    /// The wire form, sent to late joiners inside `joined`.
    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            player_turn: self.player_turn.clone(),
            player_direction: self.player_direction.clone(),
            kick_force: self.kick_force.clone(),
        }
    }
}
