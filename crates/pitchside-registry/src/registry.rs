//! The registry: the ordered roster of joined players.
//!
//! # Concurrency note
//!
//! `Registry` is NOT thread-safe by itself: it is a plain `Vec`. It is
//! owned by the router task, which processes one event at a time, so
//! register, unregister and renumber never interleave. Anything that
//! shares a `Registry` across threads must put it, together with the
//! shared turn state, behind a single lock.

use pitchside_transport::ConnectionId;

use crate::{Player, RegistryError};

/// The ordered roster.
///
/// Roster order is join order. After every successful `register` and
/// `unregister`, each player's `turn_order` equals its index, so the
/// turn orders are exactly `0..len()`.
///
/// ```text
/// register(A) register(B) register(C)   unregister(B)
///   [A0]        [A0 B1]     [A0 B1 C2] ──→ [A0 C1]
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    /// Players in turn order. Linear lookups are fine at room sizes.
    players: Vec<Player>,
}

impl Registry {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player for `id` at the end of the turn order.
    ///
    /// # Errors
    /// Returns [`RegistryError::Duplicate`] if `id` is already in the
    /// roster. The roster is left unchanged.
    pub fn register(
        &mut self,
        id: ConnectionId,
        username: impl Into<String>,
    ) -> Result<&Player, RegistryError> {
        if self.contains(id) {
            return Err(RegistryError::Duplicate(id));
        }

        let turn_order = self.players.len();
        self.players.push(Player::new(id, username.into(), turn_order));
        self.renumber();

        let player = &self.players[turn_order];
        tracing::info!(
            conn_id = %id,
            username = player.username(),
            turn_order,
            players = self.players.len(),
            "player registered"
        );
        Ok(player)
    }

    /// Removes the player for `id` and closes the gap in the turn order.
    ///
    /// Returns the removed player with the turn order it held.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` never joined. Callers
    /// tearing down a connection treat this as a no-op.
    pub fn unregister(&mut self, id: ConnectionId) -> Result<Player, RegistryError> {
        let index = self
            .position(id)
            .ok_or(RegistryError::NotFound(id))?;

        let player = self.players.remove(index);
        self.renumber();

        tracing::info!(
            conn_id = %id,
            username = player.username(),
            players = self.players.len(),
            "player unregistered"
        );
        Ok(player)
    }

    /// Reassigns every player's turn order to its index in the roster.
    fn renumber(&mut self) {
        for (index, player) in self.players.iter_mut().enumerate() {
            player.set_turn_order(index);
        }
    }

    /// Returns an owned copy of the roster in turn order.
    pub fn snapshot(&self) -> Vec<Player> {
        self.players.clone()
    }

    /// Iterates the roster in turn order without copying.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Looks up the player for a connection.
    pub fn get(&self, id: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    /// Returns `true` if the connection has a player in the roster.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody has joined.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn position(&self, id: ConnectionId) -> Option<usize> {
        self.players.iter().position(|p| p.id() == id)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `Registry`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use std::collections::BTreeSet;

    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    /// Asserts turn orders are exactly `0..len` in roster order.
    fn assert_dense(registry: &Registry) {
        let orders: Vec<usize> = registry.iter().map(Player::turn_order).collect();
        let expected: Vec<usize> = (0..registry.len()).collect();
        assert_eq!(orders, expected, "turn order must be dense");
    }

    fn names_and_orders(registry: &Registry) -> Vec<(String, usize)> {
        registry
            .snapshot()
            .iter()
            .map(|p| (p.username().to_string(), p.turn_order()))
            .collect()
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[test]
    fn test_register_first_player_gets_turn_zero() {
        let mut registry = Registry::new();

        let player = registry.register(cid(1), "Alice").expect("should succeed");

        assert_eq!(player.id(), cid(1));
        assert_eq!(player.username(), "Alice");
        assert_eq!(player.turn_order(), 0);
    }

    #[test]
    fn test_register_appends_at_end_of_order() {
        let mut registry = Registry::new();
        registry.register(cid(1), "Alice").unwrap();
        registry.register(cid(2), "Bob").unwrap();

        let player = registry.register(cid(3), "Cara").unwrap();

        assert_eq!(player.turn_order(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_register_duplicate_returns_error_and_keeps_size() {
        let mut registry = Registry::new();
        registry.register(cid(1), "Alice").unwrap();

        let result = registry.register(cid(1), "Alice again");

        assert_eq!(result, Err(RegistryError::Duplicate(cid(1))));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(cid(1)).unwrap().username(), "Alice");
    }

    #[test]
    fn test_register_same_username_different_connection_is_allowed() {
        // Identity is the connection, not the display name.
        let mut registry = Registry::new();
        registry.register(cid(1), "Guest").unwrap();

        let player = registry.register(cid(2), "Guest").unwrap();

        assert_eq!(player.turn_order(), 1);
    }

    // =====================================================================
    // unregister()
    // =====================================================================

    #[test]
    fn test_unregister_middle_player_shifts_later_players_down() {
        let mut registry = Registry::new();
        registry.register(cid(1), "A").unwrap();
        registry.register(cid(2), "B").unwrap();
        registry.register(cid(3), "C").unwrap();

        let removed = registry.unregister(cid(2)).unwrap();

        assert_eq!(removed.username(), "B");
        assert_eq!(removed.turn_order(), 1, "keeps the order it held");
        assert_eq!(
            names_and_orders(&registry),
            vec![("A".to_string(), 0), ("C".to_string(), 1)]
        );
    }

    #[test]
    fn test_unregister_first_player_renumbers_everyone() {
        let mut registry = Registry::new();
        registry.register(cid(1), "A").unwrap();
        registry.register(cid(2), "B").unwrap();
        registry.register(cid(3), "C").unwrap();

        registry.unregister(cid(1)).unwrap();

        assert_eq!(
            names_and_orders(&registry),
            vec![("B".to_string(), 0), ("C".to_string(), 1)]
        );
    }

    #[test]
    fn test_unregister_unknown_returns_not_found_and_keeps_size() {
        let mut registry = Registry::new();
        registry.register(cid(1), "A").unwrap();

        let result = registry.unregister(cid(99));

        assert_eq!(result, Err(RegistryError::NotFound(cid(99))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_twice_second_is_not_found() {
        let mut registry = Registry::new();
        registry.register(cid(1), "A").unwrap();
        registry.unregister(cid(1)).unwrap();

        assert_eq!(
            registry.unregister(cid(1)),
            Err(RegistryError::NotFound(cid(1)))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_after_unregister_reuses_freed_slot_at_end() {
        let mut registry = Registry::new();
        registry.register(cid(1), "A").unwrap();
        registry.register(cid(2), "B").unwrap();
        registry.unregister(cid(1)).unwrap();

        let player = registry.register(cid(3), "C").unwrap();

        assert_eq!(player.turn_order(), 1);
        assert_dense(&registry);
    }

    // =====================================================================
    // snapshot()
    // =====================================================================

    #[test]
    fn test_snapshot_empty_roster() {
        let registry = Registry::new();
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_snapshot_is_detached_from_later_changes() {
        let mut registry = Registry::new();
        registry.register(cid(1), "A").unwrap();
        let snapshot = registry.snapshot();

        registry.register(cid(2), "B").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_snapshot_three_joins_then_middle_leaves() {
        let mut registry = Registry::new();
        registry.register(cid(1), "Alice").unwrap();
        registry.register(cid(2), "Bob").unwrap();
        registry.register(cid(3), "Cara").unwrap();
        assert_eq!(
            names_and_orders(&registry),
            vec![
                ("Alice".to_string(), 0),
                ("Bob".to_string(), 1),
                ("Cara".to_string(), 2)
            ]
        );

        registry.unregister(cid(2)).unwrap();

        assert_eq!(
            names_and_orders(&registry),
            vec![("Alice".to_string(), 0), ("Cara".to_string(), 1)]
        );
        assert_eq!(registry.len(), 2);
    }

    // =====================================================================
    // Invariants across churn
    // =====================================================================

    #[test]
    fn test_turn_order_stays_dense_across_churn() {
        // Deterministic mixed sequence of joins, leaves, duplicate joins
        // and unknown leaves. Density and uniqueness are checked after
        // every step.
        let mut registry = Registry::new();
        let mut next = 1u64;

        for step in 0..200u64 {
            match step % 7 {
                0 | 1 | 3 => {
                    registry.register(cid(next), format!("p{next}")).unwrap();
                    next += 1;
                }
                2 => {
                    // Remove whoever sits in the middle.
                    let middle = registry.iter().nth(registry.len() / 2).map(Player::id);
                    if let Some(id) = middle {
                        registry.unregister(id).unwrap();
                    }
                }
                4 => {
                    // Duplicate join of the first player, if any.
                    let first = registry.iter().next().map(Player::id);
                    if let Some(id) = first {
                        let before = registry.len();
                        assert!(registry.register(id, "dup").is_err());
                        assert_eq!(registry.len(), before);
                    }
                }
                5 => {
                    let before = registry.len();
                    assert!(registry.unregister(cid(10_000 + step)).is_err());
                    assert_eq!(registry.len(), before);
                }
                _ => {
                    // Remove the last player.
                    let last = registry.iter().last().map(Player::id);
                    if let Some(id) = last {
                        registry.unregister(id).unwrap();
                    }
                }
            }

            assert_dense(&registry);
            let ids: BTreeSet<ConnectionId> = registry.iter().map(Player::id).collect();
            assert_eq!(ids.len(), registry.len(), "ids must be unique");
        }
    }
}
