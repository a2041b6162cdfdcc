//! Player roster for Pitchside.
//!
//! This crate owns the one piece of state with real invariants: the ordered
//! list of players who completed a join, and their turn order.
//!
//! 1. **Registration**: adding a connection's player at the end of the
//!    order ([`Registry::register`])
//! 2. **Departure**: removing a player and closing the gap
//!    ([`Registry::unregister`])
//! 3. **Listing**: an owned snapshot for replies ([`Registry::snapshot`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)  ← serializes every join/leave through one task
//!     ↕
//! Registry (this crate)  ← roster + turn order
//!     ↕
//! Protocol / Transport (below)  ← PlayerRecord, ConnectionId
//! ```

mod error;
mod player;
mod registry;

pub use error::RegistryError;
pub use player::Player;
pub use registry::Registry;
