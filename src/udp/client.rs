//! UDP chat client.

use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::reply::{Origin, ReplySource};
use crate::types::{ChatError, MAX_DATAGRAM_SIZE};

/// UDP chat client talking to a single server address.
pub struct ChatUdpClient {
    socket: UdpSocket,
    server_addr: SocketAddr,
}

impl ChatUdpClient {
    /// Bind an ephemeral local port of the same address family as `server_addr`.
    pub async fn bind(server_addr: SocketAddr) -> Result<Self, ChatError> {
        let local: SocketAddr = if server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        info!("Connected to UDP server {}", server_addr);

        Ok(Self {
            socket,
            server_addr,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ChatError> {
        self.socket.local_addr().map_err(ChatError::Io)
    }

    pub async fn send(&self, payload: &[u8]) -> Result<(), ChatError> {
        self.socket.send_to(payload, self.server_addr).await?;
        Ok(())
    }

    /// Wait for the next datagram from the server's port.
    ///
    /// Only the port is matched: a server on a wildcard or multi-homed
    /// address may answer from a different IP than the one we sent to.
    pub async fn recv(&self) -> Result<Bytes, ChatError> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            if from.port() == self.server_addr.port() {
                return Ok(Bytes::copy_from_slice(&buf[..len]));
            }
            debug!("Ignoring {} bytes from unexpected sender {}", len, from);
        }
    }

    /// Send each reply and wait for one answer, until the source is exhausted.
    pub async fn run<R: ReplySource>(&self, replies: &mut R) -> Result<usize, ChatError> {
        let mut exchanges = 0;
        while let Some(message) = replies.next_reply().await? {
            self.send(&message).await?;
            let answer = self.recv().await?;
            replies.on_received(Origin::Datagram, &answer).await?;
            exchanges += 1;
        }
        Ok(exchanges)
    }

    /// Like [`run`](Self::run), but stops as soon as `shutdown` completes.
    pub async fn run_until<F, R>(self, shutdown: F, replies: &mut R) -> Result<(), ChatError>
    where
        F: Future<Output = ()>,
        R: ReplySource,
    {
        tokio::select! {
            _ = shutdown => {
                info!("Client shutting down.");
                Ok(())
            }
            result = self.run(replies) => result.map(|count| {
                debug!(count, "reply source exhausted");
            }),
        }
    }
}
