//! Command line interface for the `rtwire` binary.
//!
//! The binary follows a realtime notification stream, driving the `auth`
//! and `subscribe` commands on every connect and printing pushed events.

use std::net::SocketAddr;

use clap::Parser;

/// Command line arguments for the `rtwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "rtwire",
    version,
    about = "Follow a realtime notification stream"
)]
pub struct Cli {
    /// Server host, optionally with a port.
    pub host: String,

    /// Endpoint path below the host.
    #[arg(long, default_value = "socket.io")]
    pub path: String,

    /// Token sent with the `auth` command after every connect.
    #[arg(long)]
    pub token: Option<String>,

    /// User whose notifications to subscribe to. May be repeated.
    #[arg(long = "subscribe-user", value_name = "ID")]
    pub subscribe_users: Vec<String>,

    /// Post whose updates to subscribe to. May be repeated.
    #[arg(long = "subscribe-post", value_name = "ID")]
    pub subscribe_posts: Vec<String>,

    /// Ping interval used until the server announces one.
    #[arg(long, value_name = "MS")]
    pub ping_interval_ms: Option<u64>,

    /// How long to wait for a command reply.
    #[arg(long, value_name = "MS")]
    pub reply_timeout_ms: Option<u64>,

    /// Label attached to log records.
    #[arg(long)]
    pub label: Option<String>,

    /// Connect with `ws://` instead of `wss://`.
    #[arg(long)]
    pub insecure_ws: bool,

    /// Serve Prometheus metrics on this address.
    #[arg(long, value_name = "ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// WebSocket URL of the realtime endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.insecure_ws { "ws" } else { "wss" };
        let path = self.path.trim_matches('/');
        if path.is_empty() {
            format!("{scheme}://{}/?EIO=3&transport=websocket", self.host)
        } else {
            format!("{scheme}://{}/{path}/?EIO=3&transport=websocket", self.host)
        }
    }
}
