use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::config::FrameConfig;
use crate::reply::{Origin, ReplySource};
use crate::stream::{FrameReader, FrameWriter};
use crate::types::ChatError;

/// TCP chat client: send a frame, then wait for the reply frame.
pub struct ChatTcpClient {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
}

impl ChatTcpClient {
    /// Connect to a chat server.
    pub async fn connect(addr: SocketAddr, config: FrameConfig) -> Result<Self, ChatError> {
        let stream = TcpStream::connect(addr).await?;
        info!("Connected to TCP server {}", stream.peer_addr()?);

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: FrameReader::new(read_half, &config),
            writer: FrameWriter::new(write_half, &config),
        })
    }

    /// Send one message as a frame.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), ChatError> {
        self.writer.write_frame(payload).await
    }

    /// Receive the next complete message.
    pub async fn recv(&mut self) -> Result<Bytes, ChatError> {
        self.reader.read_frame().await
    }

    /// Alternate send and receive until the reply source is exhausted.
    ///
    /// Returns the number of round trips completed. A server close while
    /// waiting for a reply is returned as [`ChatError::ConnectionClosed`].
    pub async fn run<R: ReplySource>(&mut self, replies: &mut R) -> Result<usize, ChatError> {
        let mut exchanges = 0;
        while let Some(message) = replies.next_reply().await? {
            self.send(&message).await?;
            let reply = self.recv().await?;
            debug!(len = reply.len(), "reply received");
            replies.on_received(Origin::Stream, &reply).await?;
            exchanges += 1;
        }
        Ok(exchanges)
    }

    /// Like [`run`](Self::run), but stops as soon as `shutdown` completes.
    pub async fn run_until<F, R>(mut self, shutdown: F, replies: &mut R) -> Result<(), ChatError>
    where
        F: Future<Output = ()>,
        R: ReplySource,
    {
        let result = tokio::select! {
            _ = shutdown => {
                info!("Client shutting down.");
                Ok(())
            }
            result = self.run(replies) => result.map(|exchanges| {
                debug!(exchanges, "reply source exhausted");
            }),
        };
        if let Err(e) = self.close().await {
            debug!("close failed: {}", e);
        }
        info!("Socket closed.");
        result
    }

    /// Shut down the write side so the server sees end of stream.
    pub async fn close(&mut self) -> Result<(), ChatError> {
        self.writer.shutdown().await
    }
}
