//! Babel console client entry point.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: server 127.0.0.1:4242, RTP port 4243, status available
//! babel
//!
//! # Start away, with a shorter reconnect delay and debug logs
//! babel --status away --reconnect-delay-secs 3 --log-level debug
//! ```
//!
//! Type `help` at the prompt for the command list.

use std::time::Duration;

use babel_cli::{ClientConfig, ConsoleDriver, Runtime};
use babel_client::CoordinatorConfig;
use babel_core::Presence;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Babel VOIP client
#[derive(Parser, Debug)]
#[command(name = "babel")]
#[command(about = "Console client for the Babel VOIP call coordinator")]
#[command(version)]
struct Args {
    /// Signaling server host
    #[arg(short, long, default_value = "127.0.0.1")]
    server: String,

    /// Signaling server port
    #[arg(short, long, default_value_t = babel_app::DEFAULT_PORT)]
    port: u16,

    /// Local RTP port
    #[arg(long, default_value_t = babel_app::DEFAULT_RTP_PORT)]
    rtp_port: u16,

    /// Account name shown in the first roster slot
    #[arg(short, long, default_value = "me")]
    username: String,

    /// Initial status (available, away, dnd, offline)
    #[arg(long, default_value = "available", value_parser = parse_status)]
    status: Presence,

    /// Seconds before reconnecting after the server drops the connection
    #[arg(long, default_value_t = 10)]
    reconnect_delay_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_status(value: &str) -> Result<Presence, String> {
    Presence::parse(value).ok_or_else(|| format!("unknown status `{value}`"))
}

impl Args {
    fn into_config(self) -> ClientConfig {
        ClientConfig {
            server: self.server,
            port: self.port,
            rtp_port: self.rtp_port,
            coordinator: CoordinatorConfig {
                username: self.username,
                initial_status: self.status,
                reconnect_delay: Duration::from_secs(self.reconnect_delay_secs),
                ..CoordinatorConfig::default()
            },
            ..ClientConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

    let config = args.into_config();
    tracing::info!(server = %config.server_addr(), rtp_port = config.rtp_port, "Babel client starting");
    tracing::info!("signaling events are read from the console, type `help`");

    let driver = ConsoleDriver::stdio(&config);
    Runtime::new(driver, config.coordinator).run().await?;

    Ok(())
}
