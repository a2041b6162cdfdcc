//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and drive it with a
//! `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use pitchside_transport::{
        Connection, Transport, TransportError, WebSocketConnection, WebSocketTransport,
    };
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let url = format!("ws://{addr}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    /// Binds on port 0 and returns the transport plus its real address.
    async fn bind_any() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport
            .local_addr()
            .expect("should have local addr")
            .to_string();
        (transport, addr)
    }

    /// Accepts one connection and completes its handshake.
    async fn accept_upgraded(transport: &mut WebSocketTransport) -> WebSocketConnection {
        transport
            .accept()
            .await
            .expect("should accept")
            .upgrade()
            .await
            .expect("should upgrade")
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move { accept_upgraded(&mut transport).await });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);

        // --- Server sends, client receives a text frame ---
        server_conn
            .send(br#"{"event":"joined"}"#)
            .await
            .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "UTF-8 payloads go out as text frames");
        assert_eq!(msg.into_data().as_ref(), br#"{"event":"joined"}"#);

        // --- Client sends text, server receives bytes ---
        client_ws
            .send(Message::Text("hello from client".to_string().into()))
            .await
            .unwrap();

        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        // --- Binary frames are accepted too ---
        client_ws
            .send(Message::Binary(b"raw".to_vec().into()))
            .await
            .unwrap();
        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, b"raw");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move { accept_upgraded(&mut transport).await });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move { accept_upgraded(&mut transport).await });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        // A recv parked on an idle socket must not block an outbound send.
        tokio::select! {
            _ = server_conn.recv() => panic!("client sent nothing"),
            sent = server_conn.send(b"ping") => sent.expect("send should succeed"),
        }

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move {
            let a = accept_upgraded(&mut transport).await;
            let b = accept_upgraded(&mut transport).await;
            (a, b)
        });
        let _c1 = connect_client(&addr).await;
        let _c2 = connect_client(&addr).await;
        let (a, b) = server_handle.await.unwrap();

        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_websocket_accept_returns_before_handshake() {
        let (mut transport, addr) = bind_any().await;

        // Plain TCP that never sends an upgrade request.
        let _idle = TcpStream::connect(&addr).await.expect("tcp connect");

        let pending = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("accept should not wait for the handshake")
            .expect("should accept");
        assert!(pending.id().into_inner() > 0);

        // The next peer is still accepted and upgraded normally.
        let server_handle = tokio::spawn(async move { accept_upgraded(&mut transport).await });
        let _client = connect_client(&addr).await;
        let conn = server_handle.await.unwrap();
        assert_ne!(conn.id(), pending.id());
    }

    #[tokio::test]
    async fn test_websocket_upgrade_idle_peer_times_out() {
        let (transport, addr) = bind_any().await;
        let mut transport = transport.with_handshake_timeout(Duration::from_millis(50));

        let _idle = TcpStream::connect(&addr).await.expect("tcp connect");
        let pending = transport.accept().await.expect("should accept");

        let result = tokio::time::timeout(Duration::from_secs(1), pending.upgrade())
            .await
            .expect("upgrade should give up on its own");
        match result {
            Err(TransportError::HandshakeFailed(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::TimedOut);
            }
            Err(other) => panic!("expected HandshakeFailed, got {other}"),
            Ok(_) => panic!("idle peer should not upgrade"),
        }
    }
}
