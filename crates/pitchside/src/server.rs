//! `PitchsideServer` builder and server loop.
//!
//! This is the entry point for running a Pitchside coordinator. It ties
//! together all the layers: transport → protocol → router → registry.

use std::sync::Arc;

use pitchside_protocol::{Codec, JsonCodec};
use pitchside_router::{spawn_router, RouterConfig, RouterHandle};
use pitchside_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::PitchsideError;

/// Address the builder binds to when none is given.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3003";

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Nothing in
/// here needs a lock: the roster lives in the router task and the codec
/// is stateless.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) router: RouterHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Pitchside server.
///
/// # Example
///
/// ```rust,no_run
/// use pitchside::prelude::*;
///
/// # async fn start() -> Result<(), PitchsideError> {
/// let server = PitchsideServer::builder()
///     .bind("0.0.0.0:3003")
///     .router_config(RouterConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PitchsideServerBuilder {
    bind_addr: String,
    router_config: RouterConfig,
}

impl PitchsideServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            router_config: RouterConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the router configuration.
    pub fn router_config(mut self, config: RouterConfig) -> Self {
        self.router_config = config;
        self
    }

    /// Binds the listener and starts the router task.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`. Must be called from
    /// within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`PitchsideError::Transport`] if the address can't be bound.
    pub async fn build(self) -> Result<PitchsideServer<JsonCodec>, PitchsideError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            router: spawn_router(self.router_config),
            codec: JsonCodec,
        });

        Ok(PitchsideServer { transport, state })
    }
}

impl Default for PitchsideServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Pitchside server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PitchsideServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl PitchsideServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> PitchsideServerBuilder {
        PitchsideServerBuilder::new()
    }
}

impl<C: Codec> PitchsideServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle to the router, e.g. to query the roster or shut
    /// the router down from outside the accept loop.
    pub fn router(&self) -> RouterHandle {
        self.state.router.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// The WebSocket handshake runs inside that task, so a peer that
    /// stalls mid-upgrade only holds up itself. A failed accept is logged
    /// and does not stop the loop. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), PitchsideError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Pitchside server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(pending, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
