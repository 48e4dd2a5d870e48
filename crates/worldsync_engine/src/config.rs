//! Configuration for the sync client.

use crate::error::{SyncError, SyncResult};
use std::time::Duration;

/// Server used when no override is supplied.
pub const DEFAULT_SERVER_URL: &str = "wss://websocket-server-kutx.onrender.com";

/// Default interval between outbound position messages (10 Hz).
pub const DEFAULT_SEND_INTERVAL: Duration = Duration::from_millis(100);

/// How the reconciler treats snapshots carrying the local identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfEchoPolicy {
    /// Drop snapshots whose id equals the local identity.
    #[default]
    Ignore,
    /// Treat them like any other remote entity.
    Apply,
}

/// Configuration for a sync client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server URL (`ws://` or `wss://`).
    pub server_url: String,
    /// Identifier of the local entity. Immutable once connected.
    pub local_id: String,
    /// Interval between outbound position messages.
    pub send_interval: Duration,
    /// Whether the publisher sends the local position at all.
    pub publish_enabled: bool,
    /// Self-echo handling in the reconciler.
    pub self_echo: SelfEchoPolicy,
    /// Upper bound on connect plus handshake.
    pub connect_timeout: Duration,
    /// Upper bound on a courteous close.
    pub close_timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration for the given local identity with defaults.
    pub fn new(local_id: impl Into<String>) -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            local_id: local_id.into(),
            send_interval: DEFAULT_SEND_INTERVAL,
            publish_enabled: true,
            self_echo: SelfEchoPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            close_timeout: Duration::from_secs(1),
        }
    }

    /// Sets the server URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Applies an optional server override from a menu or environment.
    ///
    /// `None` and blank strings keep the current URL.
    pub fn with_server_override(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.server_url = url.to_string();
        }
        self
    }

    /// Sets the send interval.
    pub fn with_send_interval(mut self, interval: Duration) -> Self {
        self.send_interval = interval;
        self
    }

    /// Enables or disables outbound publishing.
    pub fn with_publish(mut self, enabled: bool) -> Self {
        self.publish_enabled = enabled;
        self
    }

    /// Sets the self-echo policy.
    pub fn with_self_echo(mut self, policy: SelfEchoPolicy) -> Self {
        self.self_echo = policy;
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the close timeout.
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Checks the configuration before connecting.
    pub fn validate(&self) -> SyncResult<()> {
        if self.local_id.trim().is_empty() {
            return Err(SyncError::Config("local id must not be empty".into()));
        }
        if self.send_interval.is_zero() {
            return Err(SyncError::Config("send interval must be non-zero".into()));
        }
        if self.server_url.trim().is_empty() {
            return Err(SyncError::Config("server url must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_defaults() {
        let config = ClientConfig::new("player-1");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.send_interval, Duration::from_millis(100));
        assert!(config.publish_enabled);
        assert_eq!(config.self_echo, SelfEchoPolicy::Ignore);
        config.validate().unwrap();
    }

    #[test]
    fn client_config_builder() {
        let config = ClientConfig::new("player-1")
            .with_server_url("ws://127.0.0.1:9001")
            .with_send_interval(Duration::from_millis(50))
            .with_publish(false)
            .with_self_echo(SelfEchoPolicy::Apply)
            .with_connect_timeout(Duration::from_secs(2));

        assert_eq!(config.server_url, "ws://127.0.0.1:9001");
        assert_eq!(config.send_interval, Duration::from_millis(50));
        assert!(!config.publish_enabled);
        assert_eq!(config.self_echo, SelfEchoPolicy::Apply);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn server_override() {
        let config = ClientConfig::new("p").with_server_override(None);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);

        let config = ClientConfig::new("p").with_server_override(Some("   "));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);

        let config = ClientConfig::new("p").with_server_override(Some("ws://localhost:8080"));
        assert_eq!(config.server_url, "ws://localhost:8080");
    }

    #[test]
    fn validate_rejects_bad_config() {
        assert!(ClientConfig::default().validate().is_err());
        assert!(ClientConfig::new("p")
            .with_send_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ClientConfig::new("p")
            .with_server_url("")
            .validate()
            .is_err());
    }
}
