//! Wire protocol for Pitchside.
//!
//! This crate defines the "language" that clients and the coordinator
//! speak:
//!
//! - **Frame** ([`Envelope`]): one per transport message: an event name
//!   plus an opaque textual payload.
//! - **Inbound** ([`EventKind`], [`ClientEvent`]): the typed decode step
//!   that turns a payload into a validated record or a [`ProtocolError`].
//! - **Outbound** ([`ServerEvent`]): replies and broadcasts, each knowing
//!   its wire name and payload shape.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the router
//! (roster and turn state). It doesn't know about connections' state or
//! the roster: it only knows what well-formed messages look like.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope → ClientEvent) → Router
//! ```

mod codec;
mod error;
mod inbound;
mod outbound;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use inbound::{ClientEvent, DirectionChange, JoinRequest, KickForceChange, TurnChange};
pub use outbound::{Joined, PeerUpdate, RosterReply, ServerEvent};
pub use types::{
    Envelope, EventKind, PlayerCount, PlayerRecord, Recipient, TurnSnapshot, DEFAULT_USERNAME,
};
