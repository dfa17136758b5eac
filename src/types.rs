//! Core types, constants and the error taxonomy shared by every transport.

use std::io;

use clap::ValueEnum;

/// Size of the big-endian length prefix in front of every TCP frame.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Default cap on a declared frame length (8 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

/// Payload bytes handed to the transport per write call.
pub const DEFAULT_WRITE_CHUNK_SIZE: usize = 1024;

/// Largest datagram the UDP drivers accept.
pub const MAX_DATAGRAM_SIZE: usize = 1024;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 12345;

/// Errors produced by the framing layer and the transport drivers.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The peer ended the stream before a full frame arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("write failed: {0}")]
    WriteFailed(io::Error),
    #[error("declared frame length {declared} exceeds maximum {max}")]
    MalformedLength { declared: usize, max: usize },
    #[error("payload of {len} bytes exceeds maximum {max}")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl ChatError {
    /// True when the error is the normal end of a session rather than a fault.
    pub fn is_closed(&self) -> bool {
        matches!(self, ChatError::ConnectionClosed)
    }
}

/// The four roles the binary can run in.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
pub enum Mode {
    TcpServer,
    TcpClient,
    UdpServer,
    UdpClient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_values_use_snake_case_names() {
        for (name, mode) in [
            ("tcp_server", Mode::TcpServer),
            ("tcp_client", Mode::TcpClient),
            ("udp_server", Mode::UdpServer),
            ("udp_client", Mode::UdpClient),
        ] {
            assert_eq!(Mode::from_str(name, false).unwrap(), mode);
        }
        assert!(Mode::from_str("http_server", false).is_err());
    }

    #[test]
    fn only_connection_closed_is_closed() {
        assert!(ChatError::ConnectionClosed.is_closed());
        assert!(!ChatError::MalformedLength { declared: 10, max: 1 }.is_closed());
    }
}
