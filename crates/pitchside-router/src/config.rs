//! Router configuration and the per-connection state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RouterConfig
// ---------------------------------------------------------------------------

/// Configuration for the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Reject turn, direction and kick force changes from connections
    /// that have not joined yet. `roster-query` is answered either way.
    pub require_join: bool,

    /// What to do when a joined connection sends `join` again.
    pub duplicate_join: DuplicateJoinPolicy,

    /// Capacity of the router's command channel. When it fills up,
    /// connection handlers wait (bounded channel backpressure).
    pub channel_size: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            require_join: true,
            duplicate_join: DuplicateJoinPolicy::Reject,
            channel_size: 256,
        }
    }
}

/// Handling of a second `join` from an already registered connection.
///
/// The roster is left unchanged under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateJoinPolicy {
    /// Reply with `join-error` naming the duplicate.
    #[default]
    Reject,
    /// Log it and send nothing back.
    Ignore,
}

impl std::str::FromStr for DuplicateJoinPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!(
                "unknown duplicate join policy `{other}` (expected `reject` or `ignore`)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// The lifecycle state of one connection.
///
/// ```text
/// Connected ──join──→ Active ──leave / disconnect──→ Closed
///     └──────────────disconnect──────────────────────↗
/// ```
///
/// - **Connected**: the transport accepted it, no successful join yet.
///   It hears direct replies only, never broadcasts.
/// - **Active**: a player in the roster. Receives broadcasts.
/// - **Closed**: terminal. Anything it still sends is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Connected,
    Active,
    Closed,
}

impl ConnectionState {
    /// Returns `true` if the connection is in the roster.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` once the connection can no longer send or receive.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns `true` if moving to `target` is a valid transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Connected, Self::Active)
                | (Self::Connected, Self::Closed)
                | (Self::Active, Self::Closed)
        )
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Active => write!(f, "Active"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}
