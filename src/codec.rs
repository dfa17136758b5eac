//! `tokio_util` codec for length-prefixed chat frames.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::FrameConfig;
use crate::frame::{encode_frame_into, try_decode_frame};
use crate::types::ChatError;

/// Codec turning a byte stream into payloads and back.
#[derive(Debug, Clone, Copy)]
pub struct ChatFrameCodec {
    max_frame_len: usize,
}

impl ChatFrameCodec {
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }

    pub fn from_config(config: &FrameConfig) -> Self {
        Self::new(config.max_frame_len)
    }
}

impl Default for ChatFrameCodec {
    fn default() -> Self {
        Self::from_config(&FrameConfig::default())
    }
}

impl Decoder for ChatFrameCodec {
    type Item = Bytes;
    type Error = ChatError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        try_decode_frame(src, self.max_frame_len)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            // Stream ended inside a prefix or payload.
            None => Err(ChatError::ConnectionClosed),
        }
    }
}

impl<T: AsRef<[u8]>> Encoder<T> for ChatFrameCodec {
    type Error = ChatError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame_into(item.as_ref(), self.max_frame_len, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::SinkExt;
    use tokio_stream::StreamExt;
    use tokio_util::codec::{Framed, FramedRead};

    #[test]
    fn decode_eof_with_partial_frame_is_connection_closed() {
        let mut codec = ChatFrameCodec::default();
        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00, 0x05, b'h', b'e'][..]);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(ChatError::ConnectionClosed)
        ));

        let mut empty = BytesMut::new();
        assert!(codec.decode_eof(&mut empty).unwrap().is_none());
    }

    #[tokio::test]
    async fn framed_carries_messages_both_ways() {
        let (left, right) = tokio::io::duplex(64);
        let mut client = Framed::new(left, ChatFrameCodec::default());
        let mut server = Framed::new(right, ChatFrameCodec::default());

        client.send(&b"hello"[..]).await.unwrap();
        let got = server.try_next().await.unwrap().unwrap();
        assert_eq!(&got[..], b"hello");

        server.send(Bytes::from_static(b"hi")).await.unwrap();
        let got = client.try_next().await.unwrap().unwrap();
        assert_eq!(&got[..], b"hi");
    }

    #[tokio::test]
    async fn framed_read_handles_single_byte_reads() {
        let mut wire = BytesMut::new();
        ChatFrameCodec::default()
            .encode(&b"fragmented"[..], &mut wire)
            .unwrap();

        let mut builder = tokio_test::io::Builder::new();
        for byte in wire.iter() {
            builder.read(std::slice::from_ref(byte));
        }
        let mut reader = FramedRead::new(builder.build(), ChatFrameCodec::default());

        let got = reader.try_next().await.unwrap().unwrap();
        assert_eq!(&got[..], b"fragmented");
        assert!(reader.try_next().await.unwrap().is_none());
    }
}
