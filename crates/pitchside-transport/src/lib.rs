//! Transport layer for Pitchside.
//!
//! The coordinator never talks to sockets directly. It sees a per-connection
//! event channel through the [`Transport`] and [`Connection`] traits:
//! accept a connection, finish its handshake, get its unique
//! [`ConnectionId`], send and receive opaque frames, close it.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    DEFAULT_HANDSHAKE_TIMEOUT, PendingConnection, WebSocketConnection, WebSocketTransport,
};

use std::fmt;

/// Opaque identifier for a connection.
///
/// Assigned by the transport when a connection is accepted and unique for
/// the lifetime of the process. The registry uses it as the player key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// What `accept` hands back. Any protocol handshake still owed by
    /// the peer happens on this value, off the accept loop.
    type Incoming: Send + 'static;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<std::net::SocketAddr>;
}

/// A single connection that can send and receive frames.
///
/// `send` and `recv` may be driven concurrently from the same task
/// (e.g. inside `tokio::select!`); implementations must not hold one
/// direction's lock while waiting on the other.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends a frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
