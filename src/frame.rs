//! Length-prefixed frame encoding and incremental decoding.
//!
//! Wire format:
//! ```text
//! [length:4 BE u32][payload:length]
//! ```
//! No magic, version or checksum. The functions here are pure; the stream
//! and codec layers feed them from sockets.

use byteorder::{BigEndian, ByteOrder};
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::types::{ChatError, LENGTH_PREFIX_LEN};

/// Encode the 4-byte prefix for a payload of `len` bytes.
///
/// Fails with [`ChatError::PayloadTooLarge`] when `len` is above `max_len`
/// or does not fit the `u32` prefix.
pub fn encode_length_prefix(len: usize, max_len: usize) -> Result<[u8; LENGTH_PREFIX_LEN], ChatError> {
    let limit = max_len.min(u32::MAX as usize);
    if len > limit {
        return Err(ChatError::PayloadTooLarge { len, max: limit });
    }

    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    BigEndian::write_u32(&mut prefix, len as u32);
    Ok(prefix)
}

/// Encode a whole frame into a fresh buffer.
pub fn encode_frame(payload: &[u8], max_len: usize) -> Result<Bytes, ChatError> {
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    encode_frame_into(payload, max_len, &mut buf)?;
    Ok(buf.freeze())
}

/// Append one frame to `dst`.
pub fn encode_frame_into(payload: &[u8], max_len: usize, dst: &mut BytesMut) -> Result<(), ChatError> {
    let prefix = encode_length_prefix(payload.len(), max_len)?;
    dst.reserve(LENGTH_PREFIX_LEN + payload.len());
    dst.put_slice(&prefix);
    dst.put_slice(payload);
    Ok(())
}

/// Read the declared payload length if the prefix is fully buffered.
///
/// Checks the limit before any payload bytes are needed, so a corrupt
/// prefix fails fast instead of waiting for (or allocating) its payload.
pub fn peek_length(buf: &[u8], max_len: usize) -> Result<Option<usize>, ChatError> {
    if buf.len() < LENGTH_PREFIX_LEN {
        return Ok(None);
    }

    let declared = BigEndian::read_u32(&buf[..LENGTH_PREFIX_LEN]) as usize;
    if declared > max_len {
        return Err(ChatError::MalformedLength {
            declared,
            max: max_len,
        });
    }
    Ok(Some(declared))
}

/// Try to split one complete frame off the front of `buf`.
///
/// Returns `Ok(None)` while more bytes are needed; on success the frame's
/// bytes are consumed and any following bytes stay in `buf`.
pub fn try_decode_frame(buf: &mut BytesMut, max_len: usize) -> Result<Option<Bytes>, ChatError> {
    let declared = match peek_length(buf, max_len)? {
        Some(declared) => declared,
        None => return Ok(None),
    };

    let total = LENGTH_PREFIX_LEN + declared;
    if buf.len() < total {
        buf.reserve(total - buf.len());
        return Ok(None);
    }

    let mut frame = buf.split_to(total);
    frame.advance(LENGTH_PREFIX_LEN);
    Ok(Some(frame.freeze()))
}
