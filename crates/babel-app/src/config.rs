//! Client configuration.

use std::time::Duration;

use babel_client::CoordinatorConfig;
use babel_core::Presence;

/// Default signaling server port.
pub const DEFAULT_PORT: u16 = 4242;

/// Default local RTP port.
pub const DEFAULT_RTP_PORT: u16 = 4243;

/// Client configuration.
///
/// How these values are persisted is up to the frontend; the runtime only
/// reads the resulting struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Signaling server host.
    pub server: String,
    /// Signaling server port.
    pub port: u16,
    /// Local port for RTP streams
    pub rtp_port: u16,
    /// How long error toasts stay visible.
    pub toast_duration: Duration,
    /// Coordinator settings (self slot, initial status, reconnect delay).
    pub coordinator: CoordinatorConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            rtp_port: DEFAULT_RTP_PORT,
            toast_duration: Duration::from_secs(4),
            coordinator: CoordinatorConfig::default(),
        }
    }
}

impl ClientConfig {
    /// `host:port` of the signaling server.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }

    /// Status published once connected.
    pub fn initial_status(&self) -> Presence {
        self.coordinator.initial_status
    }
}
