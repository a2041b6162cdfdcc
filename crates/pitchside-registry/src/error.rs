//! Error types for the registry.

use pitchside_transport::ConnectionId;

/// Errors that can occur during roster operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The connection already has a player in the roster.
    /// A connection can join at most once.
    #[error("connection {0} has already joined")]
    Duplicate(ConnectionId),

    /// No player exists for the given connection.
    /// Expected when a connection that never joined closes.
    #[error("no player registered for connection {0}")]
    NotFound(ConnectionId),
}
