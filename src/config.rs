// src/config.rs
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

/// NFC tag reader exposing decoded NDEF records over WebSocket.
#[derive(Parser, Debug, Clone)]
#[command(name = "nfc-ndef-service", version, about)]
pub struct Config {
    /// Address the WebSocket bridge listens on
    #[arg(long, env = "NFC_LISTEN", default_value = "127.0.0.1:3500")]
    pub listen: SocketAddr,

    /// How long each PC/SC status wait blocks, in milliseconds
    #[arg(long, env = "NFC_POLL_INTERVAL_MS", default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// scan_once value used when startReading does not pass one
    #[arg(
        long,
        env = "NFC_SCAN_ONCE",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub scan_once_default: bool,

    /// Default log filter; RUST_LOG takes precedence
    #[arg(long, env = "NFC_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
