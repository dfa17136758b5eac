//! UDP chat server: every datagram gets exactly one reply.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{debug, error, info};

use crate::reply::{Origin, ReplySource};
use crate::types::{ChatError, MAX_DATAGRAM_SIZE};

/// UDP chat server
pub struct ChatUdpServer {
    socket: UdpSocket,
}

impl ChatUdpServer {
    /// Create a new UDP server bound to the specified address
    pub async fn bind(addr: SocketAddr) -> Result<Self, ChatError> {
        let socket = UdpSocket::bind(addr).await?;
        info!("UDP server listening on {}", socket.local_addr()?);

        Ok(Self { socket })
    }

    /// Get the local address this server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, ChatError> {
        self.socket.local_addr().map_err(ChatError::Io)
    }

    /// Answer datagrams until the reply source is exhausted.
    ///
    /// Returns the number of replies sent. Datagrams longer than
    /// `MAX_DATAGRAM_SIZE` are truncated by the socket. A reply that fails
    /// to send is logged and the server keeps listening.
    pub async fn run<R: ReplySource>(&self, replies: &mut R) -> Result<usize, ChatError> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut answered = 0;

        loop {
            let (len, from_addr) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    error!("Error receiving UDP packet: {}", e);
                    continue;
                }
            };
            debug!("Received {} bytes from {}", len, from_addr);
            replies
                .on_received(Origin::DatagramFrom(from_addr), &buf[..len])
                .await?;

            let Some(reply) = replies.next_reply().await? else {
                info!("No more replies; server stops");
                return Ok(answered);
            };
            match self.socket.send_to(&reply, from_addr).await {
                Ok(_) => answered += 1,
                Err(e) => error!("Error sending reply to {}: {}", from_addr, e),
            }
        }
    }

    /// Like [`run`](Self::run), but stops as soon as `shutdown` completes.
    pub async fn run_until<F, R>(self, shutdown: F, replies: &mut R) -> Result<(), ChatError>
    where
        F: Future<Output = ()>,
        R: ReplySource,
    {
        tokio::select! {
            _ = shutdown => {
                info!("Server shutting down.");
                Ok(())
            }
            result = self.run(replies) => result.map(|count| {
                debug!(count, "reply source exhausted");
            }),
        }
    }
}
