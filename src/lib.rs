//! # lpchat
//!
//! A small bidirectional chat tool over TCP or UDP, in server and client
//! roles. The interesting part is the TCP message framing: a byte stream
//! that may deliver data in arbitrary pieces is turned into whole messages.
//!
//! ## Quick Start
//!
//! ```rust
//! use bytes::BytesMut;
//! use lpchat::frame::{encode_frame, try_decode_frame};
//!
//! let encoded = encode_frame(b"hello", 1024)?;
//! assert_eq!(&encoded[..], &[0, 0, 0, 5, b'h', b'e', b'l', b'l', b'o']);
//!
//! let mut buf = BytesMut::from(&encoded[..]);
//! let decoded = try_decode_frame(&mut buf, 1024)?.unwrap();
//! assert_eq!(&decoded[..], b"hello");
//! # Ok::<(), lpchat::ChatError>(())
//! ```
//!
//! ## Wire Format
//!
//! - LENGTH (4B BE): payload length, unsigned
//! - PAYLOAD: exactly LENGTH bytes, opaque (UTF-8 text by convention)
//!
//! No magic bytes, no version field, no checksum. UDP datagrams carry the
//! raw payload with no prefix.
//!
//! ## Transport Modes
//!
//! | Mode         | Behaviour                                              |
//! |--------------|--------------------------------------------------------|
//! | `tcp_server` | serves one connection at a time, replying to each frame |
//! | `tcp_client` | sends a frame, waits for the reply frame               |
//! | `udp_server` | one reply datagram per received datagram               |
//! | `udp_client` | sends a datagram, waits for one reply                  |

pub mod cli;
pub mod codec;
pub mod config;
pub mod frame;
pub mod reply;
pub mod stream;
pub mod tcp;
pub mod types;
pub mod udp;

pub use types::{ChatError, Mode, LENGTH_PREFIX_LEN, MAX_DATAGRAM_SIZE};

pub use codec::ChatFrameCodec;
pub use config::{ChatConfig, FrameConfig};
pub use frame::{encode_frame, try_decode_frame};
pub use reply::{ConsoleReplies, Origin, ReplySource, ScriptedReplies};
pub use stream::{FrameReader, FrameWriter};
