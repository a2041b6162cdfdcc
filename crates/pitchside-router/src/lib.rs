//! Event routing for Pitchside.
//!
//! The router owns the single room: the [`Registry`](pitchside_registry::Registry)
//! of joined players, the shared [`TurnState`], and the lifecycle state of
//! every connection. It runs as one Tokio task (actor model) so all of
//! that is mutated from one place, one event at a time.
//!
//! # Key types
//!
//! - [`Session`]: the pure state machine: envelope in, outbox out
//! - [`RouterHandle`]: send commands to the running router actor
//! - [`PeerOutbound`]: what a connection handler receives
//! - [`ConnectionState`]: per-connection lifecycle
//! - [`RouterConfig`]: join gating, duplicate-join policy, channel size

mod config;
mod error;
mod router;
mod session;
mod state;

pub use config::{ConnectionState, DuplicateJoinPolicy, RouterConfig};
pub use error::RouterError;
pub use router::{spawn_router, PeerOutbound, PeerSender, RouterHandle};
pub use session::{Outbox, Session};
pub use state::TurnState;
