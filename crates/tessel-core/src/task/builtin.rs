//! Builtin task types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{RunnableTask, TaskKind, TaskOutput, TaskType};
use crate::action::{ParameterSchema, Parameters};
use crate::{Error, Result, RunContext};

/// Tracing target for builtin task logs.
const TRACING_TARGET: &str = "tessel_core::task";

/// Severity of a [`Log`] message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Logs a message in the execution's log stream.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Log {
    /// The message to log.
    pub message: String,
    /// Severity of the message.
    #[serde(default)]
    pub level: LogLevel,
}

#[async_trait::async_trait]
impl RunnableTask for Log {
    const TYPE: &'static str = "core.log";

    async fn run(self, ctx: &RunContext) -> Result<TaskOutput> {
        let execution_id = ctx.execution_id().map(|id| id.to_string()).unwrap_or_default();
        let message = self.message;

        match self.level {
            LogLevel::Trace => tracing::trace!(target: TRACING_TARGET, %execution_id, "{message}"),
            LogLevel::Debug => tracing::debug!(target: TRACING_TARGET, %execution_id, "{message}"),
            LogLevel::Info => tracing::info!(target: TRACING_TARGET, %execution_id, "{message}"),
            LogLevel::Warn => tracing::warn!(target: TRACING_TARGET, %execution_id, "{message}"),
            LogLevel::Error => tracing::error!(target: TRACING_TARGET, %execution_id, "{message}"),
        }

        Ok(None)
    }
}

/// Returns a rendered value as the task output.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Return {
    /// The value to return.
    pub format: String,
}

#[async_trait::async_trait]
impl RunnableTask for Return {
    const TYPE: &'static str = "core.return";

    async fn run(self, _ctx: &RunContext) -> Result<TaskOutput> {
        let mut output = Parameters::new();
        output.insert("value".to_string(), self.format.into());
        Ok(Some(output))
    }
}

/// Control-flow task running its children one after another.
///
/// Children are orchestrated by the workflow engine, so this type can never be
/// bound as a tool.
pub struct Sequential {
    schema: ParameterSchema,
}

impl Sequential {
    /// Type name of the sequential task.
    pub const TYPE: &'static str = "core.sequential";

    /// Creates the task type.
    pub fn new() -> Self {
        let schema = ParameterSchema::new()
            .with_description("Runs child tasks one after another.")
            .with_property(
                "tasks",
                json!({
                    "type": "array",
                    "description": "Child tasks",
                    "items": { "type": "object" }
                }),
            )
            .with_required("tasks");

        Self { schema }
    }
}

impl Default for Sequential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TaskType for Sequential {
    fn type_name(&self) -> &str {
        Self::TYPE
    }

    fn description(&self) -> Option<&str> {
        self.schema.description()
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Flowable
    }

    async fn execute(&self, _parameters: Parameters, _ctx: &RunContext) -> Result<TaskOutput> {
        Err(Error::unsupported_action(format!(
            "'{}' orchestrates child tasks and cannot run in-process",
            Self::TYPE
        )))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;
    use crate::task::TaskAdapter;

    fn params(value: serde_json::Value) -> Parameters {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn log_produces_no_output() {
        let task = TaskAdapter::<Log>::new().unwrap();
        assert_eq!(task.description(), Some("Logs a message in the execution's log stream."));
        assert!(task.schema().is_required("message"));
        assert!(!task.schema().is_required("level"));

        let output = task
            .execute(params(json!({ "message": "hi", "level": "WARN" })), &RunContext::new())
            .await
            .unwrap();
        assert!(output.is_none());
    }

    #[tokio::test]
    async fn return_outputs_value() {
        let task = TaskAdapter::<Return>::new().unwrap();
        let output = task
            .execute(params(json!({ "format": "42" })), &RunContext::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(output["value"], "42");
    }

    #[tokio::test]
    async fn reconstruction_failure_is_an_argument_error() {
        let task = TaskAdapter::<Return>::new().unwrap();
        let error = task
            .execute(params(json!({ "format": 1 })), &RunContext::new())
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidArguments);
    }

    #[tokio::test]
    async fn sequential_is_flowable() {
        let task = Sequential::new();
        assert_eq!(task.kind(), TaskKind::Flowable);
        let error = task
            .execute(Parameters::new(), &RunContext::new())
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::UnsupportedAction);
    }
}
