//! Frame reader and writer over reliable byte streams.
//!
//! [`FrameReader`] accumulates partial reads until a whole frame is buffered.
//! [`FrameWriter`] writes the prefix, then the payload in chunks, then flushes.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::config::FrameConfig;
use crate::frame::{encode_length_prefix, try_decode_frame};
use crate::types::ChatError;

const INITIAL_READ_CAPACITY: usize = 1024;

/// Reads one complete payload per call from an `AsyncRead`.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    buf: BytesMut,
    max_frame_len: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, config: &FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_READ_CAPACITY),
            max_frame_len: config.max_frame_len,
        }
    }

    /// Read the next frame's payload.
    ///
    /// Fails with [`ChatError::ConnectionClosed`] if the stream ends before
    /// a frame is complete, including a close between frames. A truncated
    /// payload is never returned.
    pub async fn read_frame(&mut self) -> Result<Bytes, ChatError> {
        loop {
            if let Some(payload) = try_decode_frame(&mut self.buf, self.max_frame_len)? {
                trace!(len = payload.len(), "frame decoded");
                return Ok(payload);
            }

            let n = self.inner.read_buf(&mut self.buf).await?;
            if n == 0 {
                debug!(buffered = self.buf.len(), "stream ended before frame completed");
                return Err(ChatError::ConnectionClosed);
            }
            trace!(n, buffered = self.buf.len(), "read chunk");
        }
    }

    /// Bytes received but not yet returned as part of a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

/// Writes payloads as frames to an `AsyncWrite`.
///
/// After any failed write the writer refuses further frames, since the peer
/// may have received a partial frame.
#[derive(Debug)]
pub struct FrameWriter<W> {
    inner: W,
    config: FrameConfig,
    poisoned: bool,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W, config: &FrameConfig) -> Self {
        Self {
            inner,
            config: *config,
            poisoned: false,
        }
    }

    /// Send one payload as one frame.
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<(), ChatError> {
        if self.poisoned {
            return Err(ChatError::WriteFailed(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "an earlier frame write failed",
            )));
        }

        let prefix = encode_length_prefix(payload.len(), self.config.max_frame_len)?;
        match self.write_parts(&prefix, payload).await {
            Ok(()) => {
                trace!(len = payload.len(), "frame written");
                Ok(())
            }
            Err(e) => {
                self.poisoned = true;
                debug!(error = %e, "frame write failed");
                Err(ChatError::WriteFailed(e))
            }
        }
    }

    async fn write_parts(&mut self, prefix: &[u8], payload: &[u8]) -> io::Result<()> {
        self.inner.write_all(prefix).await?;
        for chunk in payload.chunks(self.config.write_chunk_size.max(1)) {
            self.inner.write_all(chunk).await?;
        }
        self.inner.flush().await
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Shut down the write side of the transport.
    pub async fn shutdown(&mut self) -> Result<(), ChatError> {
        self.inner.shutdown().await.map_err(ChatError::WriteFailed)
    }
}
