use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use lpchat::{
    cli::Cli,
    tcp::{ChatTcpClient, ChatTcpServer},
    udp::{ChatUdpClient, ChatUdpServer},
    ConsoleReplies, Mode,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = ?err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    // A pending stdin read holds a blocking thread that never finishes on its own.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    let addr = config.socket_addr()?;
    let mut console = ConsoleReplies::stdio();

    match cli.mode {
        Mode::TcpServer => {
            let server = ChatTcpServer::bind(addr, config.frame)
                .await
                .with_context(|| format!("failed to bind TCP server on {addr}"))?;
            server.run_until(interrupted(), &mut console).await?;
        }
        Mode::TcpClient => {
            let client = ChatTcpClient::connect(addr, config.frame)
                .await
                .with_context(|| format!("failed to connect to {addr}"))?;
            client.run_until(interrupted(), &mut console).await?;
        }
        Mode::UdpServer => {
            let server = ChatUdpServer::bind(addr)
                .await
                .with_context(|| format!("failed to bind UDP server on {addr}"))?;
            server.run_until(interrupted(), &mut console).await?;
        }
        Mode::UdpClient => {
            let client = ChatUdpClient::bind(addr).await?;
            client.run_until(interrupted(), &mut console).await?;
        }
    }

    Ok(())
}
