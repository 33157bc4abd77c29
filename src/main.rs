//! `rtwire` binary: follow a realtime notification stream.
//!
//! Opens an auto-reconnecting connection, authenticates and subscribes on
//! every connect, and prints each pushed event as a JSON line on stdout.

mod cli;

use std::{io::Write, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use rtwire::{Connection, ConnectionEvent, ConnectionHandle, ConnectionOptions, IncomingMessage};
use serde::Serialize;
use serde_json::{json, value::RawValue};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Commands replayed after every connect.
#[derive(Debug)]
struct Handshake {
    token: Option<String>,
    user_ids: Vec<String>,
    post_ids: Vec<String>,
}

impl Handshake {
    fn from_cli(cli: &cli::Cli) -> Self {
        Self {
            token: cli.token.clone(),
            user_ids: cli.subscribe_users.clone(),
            post_ids: cli.subscribe_posts.clone(),
        }
    }

    async fn run(&self, handle: &ConnectionHandle) {
        if let Some(token) = &self.token {
            match handle.send("auth", &json!({ "authToken": token })).await {
                Ok(reply) => info!(reply = %String::from_utf8_lossy(&reply), "authenticated"),
                Err(err) => {
                    warn!(error = %err, "auth failed");
                    return;
                }
            }
        }
        if self.user_ids.is_empty() && self.post_ids.is_empty() {
            return;
        }
        let subscription = json!({ "userIds": self.user_ids, "postIds": self.post_ids });
        match handle.send("subscribe", &subscription).await {
            Ok(reply) => info!(reply = %String::from_utf8_lossy(&reply), "subscribed"),
            Err(err) => warn!(error = %err, "subscribe failed"),
        }
    }
}

#[derive(Serialize)]
struct EventLine<'a> {
    #[serde(rename = "type")]
    event_type: &'a str,
    payload: &'a RawValue,
}

fn print_message(message: &IncomingMessage) -> Result<()> {
    let payload: &RawValue =
        serde_json::from_slice(message.payload()).context("event payload is not JSON")?;
    let line = serde_json::to_string(&EventLine {
        event_type: message.event_type(),
        payload,
    })?;
    writeln!(std::io::stdout().lock(), "{line}")?;
    Ok(())
}

fn options(cli: &cli::Cli) -> ConnectionOptions {
    let mut options = ConnectionOptions::default();
    if let Some(ms) = cli.ping_interval_ms {
        options = options.ping_interval(Duration::from_millis(ms));
    }
    if let Some(ms) = cli.reply_timeout_ms {
        options = options.reply_timeout(Duration::from_millis(ms));
    }
    if let Some(label) = &cli.label {
        options = options.label(label.clone());
    }
    options
}

#[cfg(feature = "metrics")]
fn install_metrics(cli: &cli::Cli) -> Result<()> {
    if let Some(addr) = cli.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install Prometheus exporter")?;
        info!(%addr, "serving metrics");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(cli: &cli::Cli) -> Result<()> {
    if cli.metrics_addr.is_some() {
        warn!("built without the metrics feature; ignoring --metrics-addr");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // The library bridges its records to `log`; building the subscriber
    // without a `LogTracer` keeps them from being printed twice.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")?;

    let cli = cli::Cli::parse();
    install_metrics(&cli)?;

    let url = cli.url();
    info!(%url, "opening connection");
    let mut connection = Connection::open(url, options(&cli));
    let handle = connection.handle();
    let handshake = Arc::new(Handshake::from_cli(&cli));

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.context("failed to listen for ctrl-c")?;
                info!("interrupted");
                break;
            }
            event = connection.next_event() => match event {
                Some(ConnectionEvent::Connected) => {
                    let handle = handle.clone();
                    let handshake = Arc::clone(&handshake);
                    tokio::spawn(async move { handshake.run(&handle).await });
                }
                Some(ConnectionEvent::Message(message)) => {
                    if let Err(err) = print_message(&message) {
                        warn!(error = %err, event_type = message.event_type(), "could not print event");
                    }
                }
                None => break,
            },
        }
    }

    connection.close();
    connection.closed().await;
    Ok(())
}
