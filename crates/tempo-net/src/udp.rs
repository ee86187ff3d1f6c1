//! UDP transport for sync messages
//!
//! Received messages are handed into the single update thread through an
//! mpsc queue; clock state is never touched from the socket task.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use tempo_core::{TempoError, TempoResult, TimeSource};
use tempo_sync::{ClientMessage, ClockSyncServer, ServerMessage};

/// Receive buffer size, comfortably larger than the largest message.
const MAX_DATAGRAM: usize = 64;

/// One UDP socket speaking the sync wire format.
pub struct UdpEndpoint {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
}

impl UdpEndpoint {
    /// Bind to a local address
    pub async fn bind(addr: SocketAddr) -> TempoResult<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| TempoError::TransportError(e.to_string()))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| TempoError::TransportError(e.to_string()))?;

        Ok(UdpEndpoint {
            socket: Arc::new(socket),
            local_addr,
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send a client -> server message
    pub async fn send_client(&self, message: &ClientMessage, dest: SocketAddr) -> TempoResult<()> {
        let bytes = message.encode();
        self.socket
            .send_to(&bytes, dest)
            .await
            .map_err(|e| TempoError::TransportError(e.to_string()))?;
        Ok(())
    }

    /// Send a server -> client message
    pub async fn send_server(&self, message: &ServerMessage, dest: SocketAddr) -> TempoResult<()> {
        let bytes = message.encode();
        self.socket
            .send_to(&bytes, dest)
            .await
            .map_err(|e| TempoError::TransportError(e.to_string()))?;
        Ok(())
    }

    /// Receive one client -> server message
    pub async fn recv_client(&self) -> TempoResult<(ClientMessage, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (len, addr) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| TempoError::TransportError(e.to_string()))?;

        let message = ClientMessage::decode(&buf[..len])?;
        Ok((message, addr))
    }

    /// Receive one server -> client message
    pub async fn recv_server(&self) -> TempoResult<(ServerMessage, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (len, addr) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| TempoError::TransportError(e.to_string()))?;

        let message = ServerMessage::decode(&buf[..len])?;
        Ok((message, addr))
    }

    /// Get a clone of the socket for concurrent operations
    pub fn socket(&self) -> Arc<UdpSocket> {
        Arc::clone(&self.socket)
    }
}

/// Receiver half of the handoff queue into the update thread.
pub type ServerMessageReceiver = mpsc::Receiver<(ServerMessage, SocketAddr)>;

/// Start a background loop decoding server -> client messages.
///
/// Undecodable datagrams are logged and skipped. The loop ends when the
/// receiver is dropped.
pub fn start_client_receive_loop(
    socket: Arc<UdpSocket>,
    buffer_size: usize,
) -> ServerMessageReceiver {
    let (tx, rx) = mpsc::channel(buffer_size);

    tokio::spawn(async move {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, addr)) => match ServerMessage::decode(&buf[..len]) {
                    Ok(message) => {
                        if tx.send((message, addr)).await.is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(err) => {
                        tracing::warn!("discarding undecodable datagram from {}: {}", addr, err);
                    }
                },
                Err(e) => {
                    tracing::warn!("UDP receive error: {}", e);
                }
            }
        }
    });

    rx
}

/// Answer sync requests on `endpoint` until the socket fails.
///
/// Undecodable datagrams are logged and skipped rather than treated as
/// fatal.
pub async fn serve<T: TimeSource>(
    endpoint: UdpEndpoint,
    server: ClockSyncServer,
    time: T,
) -> TempoResult<()> {
    loop {
        let (message, addr) = match endpoint.recv_client().await {
            Ok(received) => received,
            Err(TempoError::TransportError(reason)) => {
                return Err(TempoError::TransportError(reason));
            }
            Err(err) => {
                tracing::warn!("discarding undecodable datagram: {}", err);
                continue;
            }
        };

        let ClientMessage::Request(request) = message;
        let response = server.handle_request(time.now(), &request);
        endpoint
            .send_server(&ServerMessage::Response(response), addr)
            .await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_core::{RequestId, SystemTimeSource};
    use tempo_sync::SyncRequest;

    #[tokio::test]
    async fn test_udp_endpoint_bind() {
        let endpoint = UdpEndpoint::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        assert_ne!(endpoint.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_request_answered_over_loopback() {
        let server_endpoint = UdpEndpoint::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let server_addr = server_endpoint.local_addr();

        tokio::spawn(serve(
            server_endpoint,
            ClockSyncServer::new(),
            SystemTimeSource::new(),
        ));

        let client_endpoint = UdpEndpoint::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let request = ClientMessage::Request(SyncRequest {
            request_id: RequestId::new(7),
        });
        client_endpoint.send_client(&request, server_addr).await.unwrap();

        let (message, from) = client_endpoint.recv_server().await.unwrap();
        assert_eq!(from, server_addr);
        match message {
            ServerMessage::Response(response) => {
                assert_eq!(response.request_id, RequestId::new(7));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_receive_loop_skips_garbage() {
        let client_endpoint = UdpEndpoint::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let client_addr = client_endpoint.local_addr();
        let mut inbox = start_client_receive_loop(client_endpoint.socket(), 16);

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(&[0xFF, 0xFF], client_addr).await.unwrap();
        sender
            .send_to(
                &ServerMessage::Dilation(tempo_sync::DilationSignal).encode(),
                client_addr,
            )
            .await
            .unwrap();

        // The garbage datagram is dropped; the dilation arrives.
        let (message, _) = inbox.recv().await.unwrap();
        assert_eq!(
            message,
            ServerMessage::Dilation(tempo_sync::DilationSignal)
        );
    }
}
