//! NATS client wrapper and connection management.
//!
//! The wrapped `async-nats` client multiplexes all operations over one TCP
//! connection and reconnects on its own; clones of [`NatsClient`] share it.

use std::sync::Arc;
use std::time::Duration;

use async_nats::{Client, ConnectOptions, jetstream};
use tokio::time::timeout;

use crate::{Error, NatsConfig, Result, TRACING_TARGET_CONNECTION};

/// NATS client wrapper with connection management.
#[derive(Debug, Clone)]
pub struct NatsClient {
    inner: Arc<NatsClientInner>,
}

#[derive(Debug)]
struct NatsClientInner {
    client: Client,
    jetstream: jetstream::Context,
    config: NatsConfig,
}

impl NatsClient {
    /// Connects to the configured servers.
    #[tracing::instrument(target = TRACING_TARGET_CONNECTION, skip_all, fields(url = %config.nats_url))]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        let mut connect_opts = ConnectOptions::new().name(config.name());

        if let Some(token) = &config.nats_token {
            connect_opts = connect_opts.token(token.clone());
        }

        if let Some(max_reconnects) = config.max_reconnects_option() {
            connect_opts = connect_opts.max_reconnects(max_reconnects);
        }

        let reconnect_delay_ms = config.reconnect_delay().as_millis().min(u64::MAX as u128) as u64;
        connect_opts = connect_opts.reconnect_delay_callback(move |attempts| {
            Duration::from_millis(std::cmp::min(
                reconnect_delay_ms * 2_u64.pow(attempts.min(32) as u32),
                30_000,
            ))
        });

        let connect_timeout = config.connect_timeout();
        connect_opts = connect_opts.connection_timeout(connect_timeout);

        let client = timeout(
            connect_timeout,
            async_nats::connect_with_options(&config.nats_url, connect_opts),
        )
        .await
        .map_err(|_| Error::Timeout {
            timeout: connect_timeout,
        })?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        let jetstream = jetstream::new(client.clone());

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_host = %server_info.host,
            server_version = %server_info.version,
            "Connected to NATS"
        );

        Ok(Self {
            inner: Arc::new(NatsClientInner {
                client,
                jetstream,
                config,
            }),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NatsConfig {
        &self.inner.config
    }

    /// Returns the JetStream context.
    #[must_use]
    pub fn jetstream(&self) -> &jetstream::Context {
        &self.inner.jetstream
    }

    /// Flushes pending messages and closes the connection.
    #[tracing::instrument(target = TRACING_TARGET_CONNECTION, skip_all)]
    pub async fn close(&self) -> Result<()> {
        self.inner
            .client
            .flush()
            .await
            .map_err(|e| Error::Connection(Box::new(e)))?;

        tracing::debug!(target: TRACING_TARGET_CONNECTION, "NATS connection flushed");
        Ok(())
    }
}
