use std::future::Future;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::config::FrameConfig;
use crate::reply::{Origin, ReplySource};
use crate::stream::{FrameReader, FrameWriter};
use crate::types::ChatError;

/// Why a session loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the connection.
    PeerClosed,
    /// The reply source had nothing more to send.
    RepliesExhausted,
}

/// Outcome of one serviced connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub received: usize,
    pub sent: usize,
    pub end: SessionEnd,
}

/// TCP chat server servicing one connection at a time.
///
/// Each accepted connection is served to completion before the next
/// `accept`. No task is spawned per connection.
pub struct ChatTcpServer {
    listener: TcpListener,
    config: FrameConfig,
}

impl ChatTcpServer {
    /// Bind to the specified address
    pub async fn bind(addr: SocketAddr, config: FrameConfig) -> Result<Self, ChatError> {
        let listener = TcpListener::bind(addr).await?;
        info!("TCP server listening on {}", listener.local_addr()?);

        Ok(Self { listener, config })
    }

    /// Get the local address this server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, ChatError> {
        self.listener.local_addr().map_err(ChatError::Io)
    }

    /// Accept and serve connections until the reply source runs dry.
    pub async fn run<R: ReplySource>(self, replies: &mut R) -> Result<(), ChatError> {
        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            info!("Connected by {}", peer);

            match Self::handle_connection(socket, replies, &self.config).await {
                Ok(report) => {
                    info!(
                        received = report.received,
                        sent = report.sent,
                        "Connection with {} closed",
                        peer
                    );
                    if report.end == SessionEnd::RepliesExhausted {
                        info!("No more replies; server stops accepting");
                        return Ok(());
                    }
                }
                Err(e) => {
                    error!("Session with {} ended with error: {}", peer, e);
                }
            }
        }
    }

    /// Like [`run`](Self::run), but stops as soon as `shutdown` completes.
    pub async fn run_until<F, R>(self, shutdown: F, replies: &mut R) -> Result<(), ChatError>
    where
        F: Future<Output = ()>,
        R: ReplySource,
    {
        let result = tokio::select! {
            _ = shutdown => {
                info!("Server shutting down.");
                Ok(())
            }
            result = self.run(replies) => result,
        };
        info!("Socket closed.");
        result
    }

    async fn handle_connection<R: ReplySource>(
        mut socket: TcpStream,
        replies: &mut R,
        config: &FrameConfig,
    ) -> Result<SessionReport, ChatError> {
        let (read_half, write_half) = socket.split();
        let mut reader = FrameReader::new(read_half, config);
        let mut writer = FrameWriter::new(write_half, config);

        let report = serve_session(&mut reader, &mut writer, replies).await?;
        if report.end == SessionEnd::RepliesExhausted {
            if let Err(e) = writer.shutdown().await {
                debug!("shutdown after last reply failed: {}", e);
            }
        }
        Ok(report)
    }
}

/// Serve one session: read a frame, hand it to `replies`, write the reply.
///
/// A peer close is the normal end of a session and is reported as
/// [`SessionEnd::PeerClosed`]; any other failure is returned as an error.
pub async fn serve_session<RD, WR, R>(
    reader: &mut FrameReader<RD>,
    writer: &mut FrameWriter<WR>,
    replies: &mut R,
) -> Result<SessionReport, ChatError>
where
    RD: AsyncRead + Unpin,
    WR: AsyncWrite + Unpin,
    R: ReplySource,
{
    let mut report = SessionReport {
        received: 0,
        sent: 0,
        end: SessionEnd::PeerClosed,
    };

    loop {
        let payload = match reader.read_frame().await {
            Ok(payload) => payload,
            Err(ChatError::ConnectionClosed) => {
                report.end = SessionEnd::PeerClosed;
                return Ok(report);
            }
            Err(e) => return Err(e),
        };
        report.received += 1;
        debug!(len = payload.len(), "frame received");
        replies.on_received(Origin::Stream, &payload).await?;

        let Some(reply) = replies.next_reply().await? else {
            report.end = SessionEnd::RepliesExhausted;
            return Ok(report);
        };
        writer.write_frame(&reply).await?;
        report.sent += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ScriptedReplies;
    use bytes::Bytes;

    #[tokio::test]
    async fn session_replies_to_each_frame_until_peer_closes() {
        let config = FrameConfig::default();
        let inbound = tokio_test::io::Builder::new()
            .read(&[0x00, 0x00, 0x00, 0x05, 0x68, 0x65, 0x6C, 0x6C, 0x6F])
            .build();
        let outbound = tokio_test::io::Builder::new()
            .write(&[0x00, 0x00, 0x00, 0x02])
            .write(&[0x68, 0x69])
            .build();

        let mut reader = FrameReader::new(inbound, &config);
        let mut writer = FrameWriter::new(outbound, &config);
        let mut replies = ScriptedReplies::new(["hi"]);

        let report = serve_session(&mut reader, &mut writer, &mut replies)
            .await
            .unwrap();
        assert_eq!(
            report,
            SessionReport {
                received: 1,
                sent: 1,
                end: SessionEnd::PeerClosed
            }
        );
        assert_eq!(
            replies.received(),
            &[(Origin::Stream, Bytes::from_static(b"hello"))]
        );
    }

    #[tokio::test]
    async fn session_stops_when_replies_run_out() {
        let config = FrameConfig::default();
        let inbound = tokio_test::io::Builder::new().read(&[0, 0, 0, 1, b'x']).build();
        let outbound = tokio_test::io::Builder::new().build();

        let mut reader = FrameReader::new(inbound, &config);
        let mut writer = FrameWriter::new(outbound, &config);
        let mut replies = ScriptedReplies::default();

        let report = serve_session(&mut reader, &mut writer, &mut replies)
            .await
            .unwrap();
        assert_eq!(report.end, SessionEnd::RepliesExhausted);
        assert_eq!(report.sent, 0);
    }

    #[tokio::test]
    async fn malformed_length_ends_session_with_error() {
        let config = FrameConfig::default().with_max_frame_len(16);
        let inbound = tokio_test::io::Builder::new().read(&[0, 0, 1, 0]).build();
        let outbound = tokio_test::io::Builder::new().build();

        let mut reader = FrameReader::new(inbound, &config);
        let mut writer = FrameWriter::new(outbound, &config);
        let mut replies = ScriptedReplies::new(["unused"]);

        let err = serve_session(&mut reader, &mut writer, &mut replies)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MalformedLength { declared: 256, max: 16 }));
        assert_eq!(replies.remaining(), 1);
    }
}
