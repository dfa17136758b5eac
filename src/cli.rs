use clap::Parser;

use crate::config::{ChatConfig, FrameConfig};
use crate::types::{Mode, DEFAULT_HOST, DEFAULT_MAX_FRAME_LEN, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about = "TCP and UDP Chat Client-Server", long_about = None)]
pub struct Cli {
    /// Mode to run the program
    #[arg(value_enum)]
    pub mode: Mode,

    /// Host IP address
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port number
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest TCP message accepted or sent, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_LEN)]
    pub max_frame_len: usize,
}

impl Cli {
    pub fn config(&self) -> ChatConfig {
        ChatConfig {
            host: self.host.clone(),
            port: self.port,
            frame: FrameConfig::default().with_max_frame_len(self.max_frame_len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let cli = Cli::try_parse_from(["lpchat", "tcp_server"]).unwrap();
        assert_eq!(cli.mode, Mode::TcpServer);
        assert_eq!(cli.config(), ChatConfig::default());
    }

    #[test]
    fn options_override_defaults() {
        let cli = Cli::try_parse_from([
            "lpchat",
            "udp_client",
            "--host",
            "10.0.0.2",
            "--port",
            "9000",
            "--max-frame-len",
            "64",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(cli.mode, Mode::UdpClient);
        assert_eq!(config.host, "10.0.0.2");
        assert_eq!(config.port, 9000);
        assert_eq!(config.frame.max_frame_len, 64);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["lpchat", "tcp-server"]).is_err());
        assert!(Cli::try_parse_from(["lpchat"]).is_err());
    }
}
