//! Execution intake backed by a JetStream stream.

use async_nats::HeaderMap;
use async_nats::jetstream::{self, stream};
use tessel_core::execution::{ExecutionDescriptor, ExecutionIntake, ExecutionRecord};

use crate::{Error, NatsClient, Result, TRACING_TARGET_INTAKE};

/// Header carrying the record id for server-side deduplication.
const MESSAGE_ID_HEADER: &str = "Nats-Msg-Id";

/// Publishes execution records to JetStream.
///
/// Each record is published as JSON to `<prefix>.<namespace>.<flowId>`, dots
/// in the namespace replaced by `_`. Submission completes once the stream
/// acknowledges the message; the execution itself is never awaited.
#[derive(Debug, Clone)]
pub struct NatsExecutionIntake {
    jetstream: jetstream::Context,
    stream_name: String,
    subject_prefix: String,
}

impl NatsExecutionIntake {
    /// Creates the intake, creating its stream if it does not exist.
    #[tracing::instrument(target = TRACING_TARGET_INTAKE, skip_all)]
    pub async fn new(client: &NatsClient) -> Result<Self> {
        let config = client.config();
        let jetstream = client.jetstream();
        let stream_name = config.stream().to_string();
        let subject_prefix = config.subject_prefix().to_string();

        match jetstream.get_stream(&stream_name).await {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET_INTAKE,
                    stream = %stream_name,
                    "Using existing stream"
                );
            }
            Err(_) => {
                tracing::debug!(
                    target: TRACING_TARGET_INTAKE,
                    stream = %stream_name,
                    "Creating new stream"
                );

                let stream_config = stream::Config {
                    name: stream_name.clone(),
                    description: Some("Flow executions submitted by tools".to_string()),
                    subjects: vec![format!("{subject_prefix}.>")],
                    ..Default::default()
                };

                jetstream
                    .create_stream(stream_config)
                    .await
                    .map_err(|e| Error::stream_error(&stream_name, e.to_string()))?;
            }
        }

        Ok(Self {
            jetstream: jetstream.clone(),
            stream_name,
            subject_prefix,
        })
    }

    /// Returns the stream name.
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Returns the subject a record is published to.
    pub fn subject(&self, record: &ExecutionRecord) -> String {
        subject(&self.subject_prefix, record)
    }

    /// Publishes a record and waits for the stream acknowledgement.
    #[tracing::instrument(
        target = TRACING_TARGET_INTAKE,
        skip_all,
        fields(execution_id = %record.id)
    )]
    pub async fn publish(&self, record: &ExecutionRecord) -> Result<()> {
        let subject = self.subject(record);
        let payload = serde_json::to_vec(record)?;
        let payload_size = payload.len();

        let mut headers = HeaderMap::new();
        headers.insert(MESSAGE_ID_HEADER, record.id.to_string().as_str());

        let ack = self
            .jetstream
            .publish_with_headers(subject.clone(), headers, payload.into())
            .await
            .map_err(|e| Error::delivery_failed(&subject, e.to_string()))?
            .await
            .map_err(|e| Error::delivery_failed(&subject, e.to_string()))?;

        tracing::info!(
            target: TRACING_TARGET_INTAKE,
            subject = %subject,
            sequence = ack.sequence,
            duplicate = ack.duplicate,
            payload_size,
            "Execution record published"
        );
        Ok(())
    }
}

fn subject(prefix: &str, record: &ExecutionRecord) -> String {
    format!(
        "{prefix}.{}.{}",
        record.namespace.replace('.', "_"),
        record.flow_id
    )
}

#[async_trait::async_trait]
impl ExecutionIntake for NatsExecutionIntake {
    async fn submit(&self, record: ExecutionRecord) -> tessel_core::Result<ExecutionDescriptor> {
        self.publish(&record).await?;
        Ok(record.descriptor())
    }
}
