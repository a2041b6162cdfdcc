//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// How long a peer may take to finish the WebSocket handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
    handshake_timeout: Duration,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        })
    }

    /// Sets how long [`PendingConnection::upgrade`] waits for the
    /// handshake before giving up on the peer.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

impl Transport for WebSocketTransport {
    type Incoming = PendingConnection;
    type Error = TransportError;

    /// Returns as soon as the TCP accept succeeds. The handshake is left
    /// to [`PendingConnection::upgrade`] so a silent peer never holds up
    /// the next accept.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %addr, "accepted TCP connection");

        Ok(PendingConnection {
            id,
            peer_addr: addr,
            stream,
            handshake_timeout: self.handshake_timeout,
        })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A TCP connection that has not completed the WebSocket handshake yet.
pub struct PendingConnection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    stream: TcpStream,
    handshake_timeout: Duration,
}

impl PendingConnection {
    /// The id the connection keeps once upgraded.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the remote address of the peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Runs the WebSocket handshake, bounded by the transport's
    /// handshake timeout.
    ///
    /// # Errors
    /// Returns [`TransportError::HandshakeFailed`] if the peer sends a bad
    /// upgrade request or does not finish in time.
    pub async fn upgrade(self) -> Result<WebSocketConnection, TransportError> {
        let Self {
            id,
            peer_addr,
            stream,
            handshake_timeout,
        } = self;

        let handshake = tokio_tungstenite::accept_async(stream);
        let ws = match tokio::time::timeout(handshake_timeout, handshake).await {
            Ok(Ok(ws)) => ws,
            Ok(Err(e)) => {
                return Err(TransportError::HandshakeFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                )));
            }
            Err(_) => {
                return Err(TransportError::HandshakeFailed(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "handshake timed out",
                )));
            }
        };
        tracing::debug!(%id, %peer_addr, "WebSocket handshake complete");

        // Split so an outbound send never waits behind a pending recv.
        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            peer_addr,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// A single WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// Returns the remote address of the peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// Payloads are textual, so UTF-8 data goes out as a text frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::Text(text.to_owned().into()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink.lock().await.send(msg).await.map_err(send_error)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(
                    tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::AlreadyClosed,
                )) => return Ok(None),
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(std::io::ErrorKind::ConnectionReset, e),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(send_error)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

fn send_error(e: tungstenite::Error) -> TransportError {
    match e {
        tungstenite::Error::ConnectionClosed
        | tungstenite::Error::AlreadyClosed => {
            TransportError::ConnectionClosed(e.to_string())
        }
        other => TransportError::SendFailed(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            other,
        )),
    }
}
