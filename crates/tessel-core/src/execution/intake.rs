//! Submission of execution records.

use std::sync::{Arc, Mutex};

use super::{ExecutionDescriptor, ExecutionRecord};
use crate::{Result, TRACING_TARGET};

/// Queue accepting new flow executions.
#[async_trait::async_trait]
pub trait ExecutionIntake: Send + Sync {
    /// Submits an execution and returns its descriptor once accepted.
    async fn submit(&self, record: ExecutionRecord) -> Result<ExecutionDescriptor>;
}

/// Intake that keeps submitted records in memory.
///
/// Useful for dry runs and tests. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIntake {
    records: Arc<Mutex<Vec<ExecutionRecord>>>,
}

impl InMemoryIntake {
    /// Creates an empty intake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records submitted so far, oldest first.
    pub fn submitted(&self) -> Vec<ExecutionRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns the number of submitted records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns whether nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ExecutionIntake for InMemoryIntake {
    async fn submit(&self, record: ExecutionRecord) -> Result<ExecutionDescriptor> {
        let descriptor = record.descriptor();
        tracing::debug!(
            target: TRACING_TARGET,
            execution_id = %record.id,
            namespace = %record.namespace,
            flow_id = %record.flow_id,
            "Execution recorded in memory"
        );

        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
        Ok(descriptor)
    }
}
