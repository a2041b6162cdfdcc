//! # Pitchside
//!
//! Real-time multiplayer session coordinator.
//!
//! Pitchside is the single authority for one room of players: it keeps
//! the roster and its dense turn order, stores the shared turn state
//! (whose turn, facing direction, kick force), and relays every change to
//! the other players. Clients never talk to each other directly.
//!
//! ## Layers
//!
//! ```text
//! pitchside-transport  WebSocket connections, ConnectionId
//! pitchside-protocol   Envelope, typed ClientEvent / ServerEvent
//! pitchside-registry   Registry: roster + turn order
//! pitchside-router     Session + router actor
//! pitchside            PitchsideServer (this crate)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pitchside::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PitchsideError> {
//!     let server = PitchsideServer::builder()
//!         .bind("0.0.0.0:3003")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::PitchsideError;
pub use server::{PitchsideServer, PitchsideServerBuilder, DEFAULT_BIND_ADDR};

pub use pitchside_protocol as protocol;
pub use pitchside_registry as registry;
pub use pitchside_router as router;
pub use pitchside_transport as transport;

/// The types most users need, in one import.
pub mod prelude {
    pub use crate::{PitchsideError, PitchsideServer, PitchsideServerBuilder};
    pub use pitchside_protocol::{
        Envelope, EventKind, PlayerCount, PlayerRecord, ServerEvent, TurnSnapshot,
    };
    pub use pitchside_router::{DuplicateJoinPolicy, RouterConfig, RouterHandle};
    pub use pitchside_transport::ConnectionId;
}
