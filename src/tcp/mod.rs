//! TCP transport: framed chat sessions over a reliable stream.

pub mod client;
pub mod server;

pub use client::ChatTcpClient;
pub use server::{serve_session, ChatTcpServer, SessionEnd, SessionReport};
