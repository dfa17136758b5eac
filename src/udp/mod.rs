//! UDP transport: one datagram in, one datagram out. No framing.

pub mod client;
pub mod server;

pub use client::ChatUdpClient;
pub use server::ChatUdpServer;
