use clap::Args;
use tessel_nats::NatsConfig;

/// NATS options; flow executions stay in memory when no URL is set.
#[derive(Debug, Clone, Args)]
pub struct NatsArgs {
    /// NATS server URL (comma-separated for clustering)
    #[arg(long = "nats-url", env = "NATS_URL")]
    pub nats_url: Option<String>,

    /// Authentication token
    #[arg(long = "nats-token", env = "NATS_TOKEN", hide_env_values = true)]
    pub nats_token: Option<String>,

    /// JetStream stream receiving execution records
    #[arg(long = "nats-stream", env = "NATS_STREAM")]
    pub nats_stream: Option<String>,

    /// Subject prefix of execution records
    #[arg(long = "nats-subject-prefix", env = "NATS_SUBJECT_PREFIX")]
    pub nats_subject_prefix: Option<String>,

    /// Connection timeout in seconds
    #[arg(long = "nats-connect-timeout", env = "NATS_CONNECT_TIMEOUT_SECS")]
    pub nats_connect_timeout: Option<u64>,
}

impl NatsArgs {
    /// Returns the connection configuration, if a server is configured.
    pub fn config(&self) -> Option<NatsConfig> {
        let url = self.nats_url.as_deref()?;
        let config = NatsConfig {
            nats_token: self.nats_token.clone(),
            nats_stream: self.nats_stream.clone(),
            nats_subject_prefix: self.nats_subject_prefix.clone(),
            nats_connect_timeout: self.nats_connect_timeout,
            ..NatsConfig::new(url)
        };
        Some(config.with_name("tessel-cli"))
    }
}
