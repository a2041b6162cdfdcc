//! Error types for the router layer.

use pitchside_transport::ConnectionId;

/// Errors that can occur during router operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// A state change arrived from a connection that has not joined.
    #[error("connection {0} has not joined")]
    NotJoined(ConnectionId),

    /// The router's command channel is closed; the actor has stopped.
    #[error("router is unavailable")]
    Unavailable,
}
