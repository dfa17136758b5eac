//! Reply sources: where outgoing messages come from and where incoming
//! ones are shown.
//!
//! The drivers never touch the terminal directly. The binary plugs in
//! [`ConsoleReplies`]; tests use [`ScriptedReplies`].

use std::collections::VecDeque;
use std::net::SocketAddr;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::types::ChatError;

/// Where a received message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A framed message on a TCP connection.
    Stream,
    /// A datagram received by a server from this sender.
    DatagramFrom(SocketAddr),
    /// A reply datagram received by a client.
    Datagram,
}

/// Supplies outgoing payloads and consumes incoming ones.
#[allow(async_fn_in_trait)]
pub trait ReplySource {
    /// Next payload to send, or `None` when there is nothing more to say.
    async fn next_reply(&mut self) -> Result<Option<Bytes>, ChatError>;

    /// Called once for every complete message received.
    async fn on_received(&mut self, origin: Origin, payload: &[u8]) -> Result<(), ChatError>;
}

/// Interactive line-by-line replies: prompts `You: ` and reads a line.
pub struct ConsoleReplies<R, W> {
    input: R,
    output: W,
    line: String,
}

impl ConsoleReplies<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleReplies<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: String::new(),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    async fn write_line(&mut self, line: &str) -> Result<(), ChatError> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}

impl<R, W> ReplySource for ConsoleReplies<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn next_reply(&mut self) -> Result<Option<Bytes>, ChatError> {
        self.output.write_all(b"You: ").await?;
        self.output.flush().await?;

        self.line.clear();
        if self.input.read_line(&mut self.line).await? == 0 {
            return Ok(None);
        }

        let text = self.line.trim_end_matches(&['\n', '\r'][..]);
        Ok(Some(Bytes::copy_from_slice(text.as_bytes())))
    }

    async fn on_received(&mut self, origin: Origin, payload: &[u8]) -> Result<(), ChatError> {
        let text = String::from_utf8_lossy(payload);
        let line = match origin {
            Origin::Stream => format!("Received ({} bytes): {}", payload.len(), text),
            Origin::DatagramFrom(addr) => format!("Received from {addr}: {text}"),
            Origin::Datagram => format!("Received: {text}"),
        };
        self.write_line(&line).await
    }
}

/// Canned replies for tests and non-interactive use.
#[derive(Debug, Default, Clone)]
pub struct ScriptedReplies {
    replies: VecDeque<Bytes>,
    received: Vec<(Origin, Bytes)>,
}

impl ScriptedReplies {
    pub fn new<I, B>(replies: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            received: Vec::new(),
        }
    }

    /// Messages received so far, in arrival order.
    pub fn received(&self) -> &[(Origin, Bytes)] {
        &self.received
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl ReplySource for ScriptedReplies {
    async fn next_reply(&mut self) -> Result<Option<Bytes>, ChatError> {
        Ok(self.replies.pop_front())
    }

    async fn on_received(&mut self, origin: Origin, payload: &[u8]) -> Result<(), ChatError> {
        self.received.push((origin, Bytes::copy_from_slice(payload)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_prompts_and_strips_line_endings() {
        let input: &[u8] = b"hello there\r\nsecond\n";
        let mut console = ConsoleReplies::new(input, Vec::new());

        assert_eq!(
            console.next_reply().await.unwrap().as_deref(),
            Some(&b"hello there"[..])
        );
        assert_eq!(
            console.next_reply().await.unwrap().as_deref(),
            Some(&b"second"[..])
        );
        assert!(console.next_reply().await.unwrap().is_none());

        assert_eq!(console.into_output(), b"You: You: You: ".to_vec());
    }

    #[tokio::test]
    async fn console_sends_empty_line_as_empty_payload() {
        let input: &[u8] = b"\n";
        let mut console = ConsoleReplies::new(input, Vec::new());
        assert_eq!(console.next_reply().await.unwrap(), Some(Bytes::new()));
    }

    #[tokio::test]
    async fn console_formats_received_messages() {
        let input: &[u8] = b"";
        let mut console = ConsoleReplies::new(input, Vec::new());
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();

        console.on_received(Origin::Stream, b"hi").await.unwrap();
        console
            .on_received(Origin::DatagramFrom(peer), b"ping")
            .await
            .unwrap();
        console.on_received(Origin::Datagram, b"pong").await.unwrap();

        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(
            output,
            "Received (2 bytes): hi\nReceived from 127.0.0.1:4000: ping\nReceived: pong\n"
        );
    }

    #[tokio::test]
    async fn scripted_replies_drain_in_order() {
        let mut script = ScriptedReplies::new(["a", "b"]);
        assert_eq!(script.next_reply().await.unwrap().as_deref(), Some(&b"a"[..]));
        script.on_received(Origin::Stream, b"x").await.unwrap();
        assert_eq!(script.remaining(), 1);
        assert_eq!(script.next_reply().await.unwrap().as_deref(), Some(&b"b"[..]));
        assert!(script.next_reply().await.unwrap().is_none());
        assert_eq!(script.received().len(), 1);
    }
}
