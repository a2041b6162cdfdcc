//! The session: roster, shared turn state and per-connection state.
//!
//! `Session` is the pure half of the router. It does no I/O: each method
//! takes one event, applies it, and returns the messages it produced
//! paired with their [`Recipient`]. The router actor owns the only
//! `Session` and feeds it one command at a time, which is what keeps
//! register, unregister, renumber and field updates from interleaving.
//!
//! ```text
//! Envelope ──decode──→ ClientEvent ──apply──→ Outbox [(Recipient, PeerOutbound)]
//!              │
//!              └─ error ──→ [(Player(sender), <kind>-error)]
//! ```

use std::collections::HashMap;

use pitchside_protocol::{
    ClientEvent, Envelope, EventKind, JoinRequest, Joined, PeerUpdate, PlayerCount, PlayerRecord,
    Recipient, RosterReply, ServerEvent, TurnSnapshot,
};
use pitchside_registry::{Player, Registry, RegistryError};
use pitchside_transport::ConnectionId;

use crate::{
    ConnectionState, DuplicateJoinPolicy, PeerOutbound, RouterConfig, RouterError, TurnState,
};

/// Messages produced by one event, in delivery order.
pub type Outbox = Vec<(Recipient, PeerOutbound)>;

/// Everything the router knows about the single room.
#[derive(Debug, Default)]
pub struct Session {
    config: RouterConfig,
    registry: Registry,
    turn_state: TurnState,
    connections: HashMap<ConnectionId, ConnectionState>,
}

impl Session {
    /// Creates an empty session.
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Records a newly accepted connection as `Connected`.
    pub fn connect(&mut self, id: ConnectionId) {
        if self.connections.contains_key(&id) {
            tracing::debug!(conn_id = %id, "connection already known");
            return;
        }
        self.connections.insert(id, ConnectionState::Connected);
        tracing::info!(
            conn_id = %id,
            connections = self.connections.len(),
            "connection opened"
        );
    }

    /// Applies one inbound envelope from `id`.
    ///
    /// Unknown event names, and anything from a connection that is
    /// unknown or already `Closed`, are logged and dropped. A payload
    /// that fails to decode gets a `<kind>-error` reply to `id` and
    /// changes nothing.
    pub fn handle(&mut self, id: ConnectionId, envelope: &Envelope) -> Outbox {
        let state = match self.connections.get(&id) {
            Some(state) if !state.is_closed() => *state,
            _ => {
                tracing::debug!(
                    conn_id = %id,
                    event = %envelope.event,
                    "message from unknown or closed connection, dropping"
                );
                return Vec::new();
            }
        };

        let kind = match envelope.event.parse::<EventKind>() {
            Ok(kind) => kind,
            Err(err) => {
                tracing::debug!(conn_id = %id, error = %err, "dropping message");
                return Vec::new();
            }
        };

        let event = match ClientEvent::decode(kind, &envelope.data) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(
                    conn_id = %id,
                    %kind,
                    error = %err,
                    validation = err.is_validation(),
                    "message rejected"
                );
                return reject(id, kind, err);
            }
        };

        if kind.is_state_change() && self.config.require_join && !state.is_active() {
            let err = RouterError::NotJoined(id);
            tracing::warn!(conn_id = %id, %kind, "state change before join");
            return reject(id, kind, err);
        }

        match event {
            ClientEvent::Join(request) => self.join(id, request),
            ClientEvent::Leave => self.leave(id),
            ClientEvent::RosterQuery => reply(id, ServerEvent::RosterReply(self.roster())),
            ClientEvent::TurnChange(change) => {
                self.turn_state.set_player_turn(change.player_turn.clone());
                rebroadcast(id, ServerEvent::TurnChange(change))
            }
            ClientEvent::DirectionChange(change) => {
                self.turn_state
                    .set_player_direction(change.player_direction.clone());
                rebroadcast(id, ServerEvent::DirectionChange(change))
            }
            ClientEvent::KickForceChange(change) => {
                self.turn_state.set_kick_force(change.kick_force.clone());
                rebroadcast(id, ServerEvent::KickForceChange(change))
            }
        }
    }

    /// Tears down a connection that closed for any reason.
    ///
    /// Safe for connections that never joined or were never seen: those
    /// produce no messages.
    pub fn disconnect(&mut self, id: ConnectionId) -> Outbox {
        let Some(state) = self.connections.remove(&id) else {
            tracing::debug!(conn_id = %id, "disconnect of unknown connection");
            return Vec::new();
        };
        tracing::info!(
            conn_id = %id,
            %state,
            connections = self.connections.len(),
            "connection closed"
        );
        self.depart(id)
    }

    /// The current roster, as sent in `roster-reply`.
    pub fn roster(&self) -> RosterReply {
        RosterReply {
            players: self.records(),
            player_count: self.player_count(),
        }
    }

    /// The current shared turn state.
    pub fn turn_snapshot(&self) -> TurnSnapshot {
        self.turn_state.snapshot()
    }

    /// The lifecycle state of a connection, if it is still tracked.
    pub fn state(&self, id: ConnectionId) -> Option<ConnectionState> {
        self.connections.get(&id).copied()
    }

    /// Connections that receive broadcasts, in turn order.
    ///
    /// Exactly the registered players: a connection becomes `Active` in
    /// the same step that registers it, and leaves the roster in the
    /// same step that ends its `Active` state.
    pub fn active_ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.registry.iter().map(Player::id)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn join(&mut self, id: ConnectionId, request: JoinRequest) -> Outbox {
        let registered = self
            .registry
            .register(id, request.username)
            .map(Player::to_record);
        let player = match registered {
            Ok(player) => player,
            Err(err) => return self.duplicate_join(id, err),
        };
        self.transition(id, ConnectionState::Active);

        let joined = Joined {
            player: player.clone(),
            players: self.records(),
            player_count: self.player_count(),
            turn_state: self.turn_state.snapshot(),
        };
        let update = PeerUpdate {
            player,
            player_count: self.player_count(),
        };
        vec![
            (
                Recipient::Player(id),
                PeerOutbound::Event(ServerEvent::Joined(joined)),
            ),
            (
                Recipient::AllExcept(id),
                PeerOutbound::Event(ServerEvent::PeerJoined(update)),
            ),
        ]
    }

    fn duplicate_join(&self, id: ConnectionId, err: RegistryError) -> Outbox {
        match self.config.duplicate_join {
            DuplicateJoinPolicy::Reject => {
                tracing::warn!(conn_id = %id, error = %err, "duplicate join rejected");
                reject(id, EventKind::Join, err)
            }
            DuplicateJoinPolicy::Ignore => {
                tracing::info!(conn_id = %id, error = %err, "duplicate join ignored");
                Vec::new()
            }
        }
    }

    fn leave(&mut self, id: ConnectionId) -> Outbox {
        let mut outbox = self.depart(id);
        self.transition(id, ConnectionState::Closed);
        outbox.push((Recipient::Player(id), PeerOutbound::Close));
        outbox
    }

    /// Removes `id` from the roster and announces it to everyone still on
    /// it. NotFound means the connection never joined and is absorbed here.
    fn depart(&mut self, id: ConnectionId) -> Outbox {
        match self.registry.unregister(id) {
            Ok(player) => {
                let update = PeerUpdate {
                    player: player.to_record(),
                    player_count: self.player_count(),
                };
                vec![(
                    Recipient::All,
                    PeerOutbound::Event(ServerEvent::PeerLeft(update)),
                )]
            }
            Err(err) => {
                tracing::debug!(conn_id = %id, error = %err, "nothing to unregister");
                Vec::new()
            }
        }
    }

    fn transition(&mut self, id: ConnectionId, target: ConnectionState) {
        if let Some(state) = self.connections.get_mut(&id) {
            if state.can_transition_to(target) {
                *state = target;
            } else {
                tracing::debug!(
                    conn_id = %id,
                    from = %state,
                    to = %target,
                    "invalid connection transition ignored"
                );
            }
        }
    }

    fn records(&self) -> Vec<PlayerRecord> {
        let players = self.registry.snapshot();
        players.iter().map(Player::to_record).collect()
    }

    fn player_count(&self) -> PlayerCount {
        PlayerCount(self.registry.len())
    }
}

fn reply(id: ConnectionId, event: ServerEvent) -> Outbox {
    vec![(Recipient::Player(id), PeerOutbound::Event(event))]
}

/// Replies with the `<kind>-error` for a rejected message. Kinds without
/// an error reply are only logged.
fn reject(id: ConnectionId, kind: EventKind, reason: impl std::fmt::Display) -> Outbox {
    match ServerEvent::error(kind, reason) {
        Some(event) => reply(id, event),
        None => {
            tracing::debug!(conn_id = %id, %kind, "no error reply for this kind");
            Vec::new()
        }
    }
}

fn rebroadcast(id: ConnectionId, event: ServerEvent) -> Outbox {
    vec![(Recipient::AllExcept(id), PeerOutbound::Event(event))]
}

// =========================================================================
// Tests
// =========================================================================
