//! Runtime configuration for the framing layer and the drivers.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::types::{
    ChatError, DEFAULT_HOST, DEFAULT_MAX_FRAME_LEN, DEFAULT_PORT, DEFAULT_WRITE_CHUNK_SIZE,
};

/// Limits applied by the frame reader and writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Largest payload accepted on read or write.
    pub max_frame_len: usize,
    /// Payload bytes per transport write. Does not affect the wire format.
    pub write_chunk_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            write_chunk_size: DEFAULT_WRITE_CHUNK_SIZE,
        }
    }
}

impl FrameConfig {
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn with_write_chunk_size(mut self, write_chunk_size: usize) -> Self {
        // A zero chunk size would never make progress.
        self.write_chunk_size = write_chunk_size.max(1);
        self
    }
}

/// Endpoint plus framing limits for one run of the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub host: String,
    pub port: u16,
    pub frame: FrameConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            frame: FrameConfig::default(),
        }
    }
}

impl ChatConfig {
    /// Resolve `host:port` to the first matching socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ChatError> {
        let target = format!("{}:{}", self.host, self.port);
        target
            .to_socket_addrs()
            .map_err(|e| ChatError::InvalidAddress(format!("{target}: {e}")))?
            .next()
            .ok_or(ChatError::InvalidAddress(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 12345);
        assert_eq!(config.frame.write_chunk_size, 1024);
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:12345".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let frame = FrameConfig::default().with_write_chunk_size(0);
        assert_eq!(frame.write_chunk_size, 1);
    }

    #[test]
    fn unresolvable_host_is_rejected() {
        let config = ChatConfig {
            host: "not a host".into(),
            ..ChatConfig::default()
        };
        assert!(matches!(
            config.socket_addr(),
            Err(ChatError::InvalidAddress(_))
        ));
    }
}
