//! Flow executions submitted by flow tools.
//!
//! An [`ExecutionRecord`] is the fully reconciled request to start a flow. It
//! is handed to an [`ExecutionIntake`], which queues it and answers with an
//! [`ExecutionDescriptor`] describing the created execution.

mod intake;

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display};
use uuid::Uuid;

pub use self::intake::{ExecutionIntake, InMemoryIntake};
use crate::label::Labels;

/// Invoking execution of a submitted flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentExecution {
    /// Id of the invoking execution.
    pub execution_id: Uuid,
    /// Namespace of the invoking flow.
    pub namespace: String,
    /// Id of the invoking flow.
    pub flow_id: String,
}

/// Request to start a flow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// Id of the new execution.
    pub id: Uuid,
    /// Namespace of the target flow.
    pub namespace: String,
    /// Id of the target flow.
    pub flow_id: String,
    /// Revision the target resolved to.
    pub revision: u32,
    /// Reconciled inputs.
    pub inputs: BTreeMap<String, Value>,
    /// Effective labels.
    pub labels: Labels,
    /// Date the execution should start at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<Timestamp>,
    /// Time the record was built.
    pub created_at: Timestamp,
    /// Invoking execution, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentExecution>,
}

impl ExecutionRecord {
    /// Creates a record with a fresh time-ordered id.
    pub fn new(namespace: impl Into<String>, flow_id: impl Into<String>, revision: u32) -> Self {
        Self {
            id: Uuid::now_v7(),
            namespace: namespace.into(),
            flow_id: flow_id.into(),
            revision,
            inputs: BTreeMap::new(),
            labels: Labels::default(),
            schedule_date: None,
            created_at: Timestamp::now(),
            parent: None,
        }
    }

    /// Sets the inputs.
    pub fn with_inputs(mut self, inputs: BTreeMap<String, Value>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Sets the labels.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Schedules the execution for a later date.
    pub fn scheduled_for(mut self, timestamp: Timestamp) -> Self {
        self.schedule_date = Some(timestamp);
        self
    }

    /// Sets the invoking execution.
    pub fn with_parent(mut self, parent: ParentExecution) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the state the execution starts in.
    pub fn initial_state(&self) -> ExecutionState {
        match self.schedule_date {
            Some(date) if date > self.created_at => ExecutionState::Scheduled,
            _ => ExecutionState::Created,
        }
    }

    /// Builds the descriptor returned once the record is accepted.
    pub fn descriptor(&self) -> ExecutionDescriptor {
        ExecutionDescriptor {
            id: self.id,
            namespace: self.namespace.clone(),
            flow_id: self.flow_id.clone(),
            revision: self.revision,
            state: self.initial_state(),
            schedule_date: self.schedule_date,
            labels: self.labels.clone(),
        }
    }
}

/// State of an execution right after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ExecutionState {
    /// Queued for immediate start.
    Created,
    /// Waiting for its schedule date.
    Scheduled,
}

/// Description of a submitted execution, returned to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDescriptor {
    /// Id of the created execution.
    pub id: Uuid,
    /// Namespace of the executed flow.
    pub namespace: String,
    /// Id of the executed flow.
    pub flow_id: String,
    /// Revision of the executed flow.
    pub revision: u32,
    /// State right after submission.
    pub state: ExecutionState,
    /// Date the execution starts at, if scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<Timestamp>,
    /// Labels of the execution.
    pub labels: Labels,
}
