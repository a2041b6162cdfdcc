//! Per-connection handler: frame decoding and outbound delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Finish the WebSocket handshake (bounded by the transport timeout)
//!   2. Register the connection and its outbound channel with the router
//!   3. Loop: select between inbound frames (decoded and forwarded to the
//!      router) and outbound messages (encoded and sent)
//!   4. On close, error, or `PeerOutbound::Close`: exit; the drop guard
//!      tells the router the connection is gone

use std::sync::Arc;

use pitchside_protocol::{Codec, Envelope, ServerEvent};
use pitchside_router::{PeerOutbound, RouterHandle};
use pitchside_transport::{Connection, ConnectionId, PendingConnection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::PitchsideError;

/// Drop guard that reports the connection as gone when the handler
/// exits, whether it returned normally, with an error, or panicked.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async send.
struct ConnectionGuard {
    conn_id: ConnectionId,
    router: RouterHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let router = self.router.clone();
        // No runtime means the process is shutting down; nothing to tell.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(e) = router.disconnect(conn_id).await {
                    tracing::debug!(%conn_id, error = %e, "disconnect not delivered");
                }
            });
        }
    }
}

/// Handles a single connection from accept to close.
///
/// A peer that never completes the handshake is dropped here without
/// ever reaching the router.
pub(crate) async fn handle_connection<C: Codec>(
    pending: PendingConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PitchsideError> {
    let conn_id = pending.id();
    let conn = match pending.upgrade().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "WebSocket handshake failed");
            return Ok(());
        }
    };
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "connection accepted");

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.router.connect(conn_id, tx).await?;
    let _guard = ConnectionGuard {
        conn_id,
        router: state.router.clone(),
    };

    let mut seq: u64 = 1;

    loop {
        tokio::select! {
            frame = conn.recv() => {
                let data = match frame {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%conn_id, "connection closed by peer");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };

                let envelope: Envelope = match state.codec.decode(&data) {
                    Ok(env) => env,
                    Err(e) => {
                        tracing::debug!(
                            %conn_id, error = %e, "failed to decode envelope"
                        );
                        continue;
                    }
                };
                state.router.inbound(conn_id, envelope).await?;
            }

            outbound = rx.recv() => match outbound {
                Some(PeerOutbound::Event(event)) => {
                    send_event(&conn, &state.codec, &event, next_seq(&mut seq))
                        .await?;
                }
                Some(PeerOutbound::Close) | None => {
                    tracing::info!(%conn_id, "closing connection");
                    if let Err(e) = conn.close().await {
                        tracing::debug!(%conn_id, error = %e, "close failed");
                    }
                    break;
                }
            },
        }
    }

    // _guard drops here → router disconnect fires.
    Ok(())
}

/// Encodes an event into an envelope and sends it to the client.
async fn send_event(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    event: &ServerEvent,
    seq: u64,
) -> Result<(), PitchsideError> {
    let envelope = event.to_envelope(seq)?;
    let bytes = codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
