//! Router actor: the single Tokio task that owns the [`Session`].
//!
//! Connection handlers never touch the roster. They send commands
//! through a bounded mpsc channel and receive outbound messages on their
//! own unbounded channel. Because the actor handles one command at a
//! time, every join, leave and state change is applied to completion
//! before the next one starts.

use std::collections::HashMap;

use pitchside_protocol::{Envelope, Recipient, RosterReply, ServerEvent, TurnSnapshot};
use pitchside_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::session::Outbox;
use crate::{RouterConfig, RouterError, Session};

/// An outbound message from the router to a connection handler.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerOutbound {
    /// Encode and send this event.
    Event(ServerEvent),
    /// Close the connection. Sent after an explicit `leave` and on
    /// shutdown.
    Close,
}

/// Channel sender for delivering outbound messages to a connection.
pub type PeerSender = mpsc::UnboundedSender<PeerOutbound>;

/// Commands sent to the router actor through its channel.
pub(crate) enum RouterCommand {
    /// A connection was accepted.
    Connect {
        conn_id: ConnectionId,
        sender: PeerSender,
    },

    /// An envelope arrived from a connection.
    Inbound {
        conn_id: ConnectionId,
        envelope: Envelope,
    },

    /// A connection closed, cleanly or not.
    Disconnect { conn_id: ConnectionId },

    /// Request the current roster.
    Roster {
        reply: oneshot::Sender<RosterReply>,
    },

    /// Request the current shared turn state.
    TurnState {
        reply: oneshot::Sender<TurnSnapshot>,
    },

    /// Close every connection and stop.
    Shutdown,
}

/// Handle to the running router actor.
///
/// This is cheap to clone: it's just an `mpsc::Sender` wrapper. Every
/// connection handler holds one.
#[derive(Clone)]
pub struct RouterHandle {
    sender: mpsc::Sender<RouterCommand>,
}

impl RouterHandle {
    /// Registers a connection and the channel its messages go out on.
    pub async fn connect(
        &self,
        conn_id: ConnectionId,
        sender: PeerSender,
    ) -> Result<(), RouterError> {
        self.send(RouterCommand::Connect { conn_id, sender }).await
    }

    /// Forwards an inbound envelope (fire-and-forget).
    pub async fn inbound(
        &self,
        conn_id: ConnectionId,
        envelope: Envelope,
    ) -> Result<(), RouterError> {
        self.send(RouterCommand::Inbound { conn_id, envelope }).await
    }

    /// Reports that a connection closed.
    pub async fn disconnect(&self, conn_id: ConnectionId) -> Result<(), RouterError> {
        self.send(RouterCommand::Disconnect { conn_id }).await
    }

    /// Requests the current roster.
    ///
    /// Commands are handled in order, so the reply reflects every
    /// command this handle sent before it.
    pub async fn roster(&self) -> Result<RosterReply, RouterError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RouterCommand::Roster { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RouterError::Unavailable)
    }

    /// Requests the current shared turn state.
    pub async fn turn_state(&self) -> Result<TurnSnapshot, RouterError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RouterCommand::TurnState { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RouterError::Unavailable)
    }

    /// Tells the router to close every connection and stop.
    pub async fn shutdown(&self) -> Result<(), RouterError> {
        self.send(RouterCommand::Shutdown).await
    }

    async fn send(&self, cmd: RouterCommand) -> Result<(), RouterError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RouterError::Unavailable)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RouterActor {
    session: Session,
    /// Per-connection outbound channels.
    senders: HashMap<ConnectionId, PeerSender>,
    receiver: mpsc::Receiver<RouterCommand>,
}

impl RouterActor {
    /// Runs the actor loop, processing commands until shutdown or until
    /// every handle is dropped.
    async fn run(mut self) {
        tracing::info!("router started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RouterCommand::Connect { conn_id, sender } => {
                    self.senders.insert(conn_id, sender);
                    self.session.connect(conn_id);
                }
                RouterCommand::Inbound { conn_id, envelope } => {
                    let outbox = self.session.handle(conn_id, &envelope);
                    self.dispatch(outbox);
                }
                RouterCommand::Disconnect { conn_id } => {
                    self.senders.remove(&conn_id);
                    let outbox = self.session.disconnect(conn_id);
                    self.dispatch(outbox);
                }
                RouterCommand::Roster { reply } => {
                    let _ = reply.send(self.session.roster());
                }
                RouterCommand::TurnState { reply } => {
                    let _ = reply.send(self.session.turn_snapshot());
                }
                RouterCommand::Shutdown => {
                    tracing::info!(connections = self.senders.len(), "router shutting down");
                    for sender in self.senders.values() {
                        let _ = sender.send(PeerOutbound::Close);
                    }
                    break;
                }
            }
        }

        tracing::info!("router stopped");
    }

    /// Dispatches outbound messages to the correct recipients.
    ///
    /// `All` and `AllExcept` reach active connections only.
    fn dispatch(&self, outbox: Outbox) {
        for (recipient, outbound) in outbox {
            match recipient {
                Recipient::All => {
                    for conn_id in self.session.active_ids() {
                        self.send_to(conn_id, outbound.clone());
                    }
                }
                Recipient::Player(conn_id) => {
                    self.send_to(conn_id, outbound);
                }
                Recipient::AllExcept(excluded) => {
                    for conn_id in self.session.active_ids() {
                        if conn_id != excluded {
                            self.send_to(conn_id, outbound.clone());
                        }
                    }
                }
            }
        }
    }

    /// Sends an outbound message to a single connection. Silently drops
    /// it if the receiver is gone (handler already exited).
    fn send_to(&self, conn_id: ConnectionId, msg: PeerOutbound) {
        if let Some(sender) = self.senders.get(&conn_id) {
            let _ = sender.send(msg);
        }
    }
}

/// Spawns the router actor task and returns a handle to communicate
/// with it. Must be called from within a Tokio runtime.
///
/// `config.channel_size` controls backpressure: if the channel fills
/// up, senders will wait (bounded channel).
pub fn spawn_router(config: RouterConfig) -> RouterHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let actor = RouterActor {
        session: Session::new(config),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RouterHandle { sender: tx }
}
