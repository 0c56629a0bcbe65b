//! NATS connection and intake configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_NAME: &str = "tessel";
const DEFAULT_STREAM: &str = "EXECUTIONS";
const DEFAULT_SUBJECT_PREFIX: &str = "executions";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RECONNECTS: usize = 10;
const DEFAULT_RECONNECT_DELAY_SECS: u64 = 2;

/// Configuration of the NATS connection flow executions are submitted over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatsConfig {
    /// NATS server URL (comma-separated for clustering)
    pub nats_url: String,

    /// Authentication token (optional)
    #[serde(default)]
    pub nats_token: Option<String>,

    /// Client connection name
    #[serde(default)]
    pub nats_client_name: Option<String>,

    /// Connection timeout in seconds
    #[serde(default)]
    pub nats_connect_timeout: Option<u64>,

    /// Maximum number of reconnection attempts (0 = unlimited)
    #[serde(default)]
    pub nats_max_reconnects: Option<usize>,

    /// JetStream stream receiving execution records
    #[serde(default)]
    pub nats_stream: Option<String>,

    /// Subject prefix of execution records
    #[serde(default)]
    pub nats_subject_prefix: Option<String>,
}

impl NatsConfig {
    /// Creates a configuration for the given server URL.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            nats_url: server_url.into(),
            nats_token: None,
            nats_client_name: None,
            nats_connect_timeout: None,
            nats_max_reconnects: None,
            nats_stream: None,
            nats_subject_prefix: None,
        }
    }

    /// Returns the client name, using the default if not set.
    #[inline]
    pub fn name(&self) -> &str {
        self.nats_client_name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    /// Returns the stream name, using the default if not set.
    #[inline]
    pub fn stream(&self) -> &str {
        self.nats_stream.as_deref().unwrap_or(DEFAULT_STREAM)
    }

    /// Returns the subject prefix, using the default if not set.
    #[inline]
    pub fn subject_prefix(&self) -> &str {
        self.nats_subject_prefix
            .as_deref()
            .map(|prefix| prefix.trim_end_matches('.'))
            .unwrap_or(DEFAULT_SUBJECT_PREFIX)
    }

    /// Returns the connection timeout.
    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.nats_connect_timeout
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Returns the reconnect delay.
    #[inline]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(DEFAULT_RECONNECT_DELAY_SECS)
    }

    /// Returns the max reconnects as Option (0 means unlimited).
    #[inline]
    pub fn max_reconnects_option(&self) -> Option<usize> {
        let max = self.nats_max_reconnects.unwrap_or(DEFAULT_MAX_RECONNECTS);
        if max == 0 { None } else { Some(max) }
    }

    /// Sets the authentication token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.nats_token = Some(token.into());
        self
    }

    /// Sets the client connection name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.nats_client_name = Some(name.into());
        self
    }

    /// Sets the connection timeout in seconds.
    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.nats_connect_timeout = Some(secs);
        self
    }

    /// Sets the stream name.
    #[must_use]
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.nats_stream = Some(stream.into());
        self
    }

    /// Sets the subject prefix.
    #[must_use]
    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.nats_subject_prefix = Some(prefix.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults() {
        let config = NatsConfig::new("nats://localhost:4222");
        assert_eq!(config.name(), "tessel");
        assert_eq!(config.stream(), "EXECUTIONS");
        assert_eq!(config.subject_prefix(), "executions");
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_reconnects_option(), Some(10));
    }

    #[test]
    fn overrides_apply() {
        let config = NatsConfig::new("nats://localhost:4222")
            .with_stream("FLOWS")
            .with_subject_prefix("flows.")
            .with_connect_timeout_secs(5);

        assert_eq!(config.stream(), "FLOWS");
        assert_eq!(config.subject_prefix(), "flows");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }
}
