//! Synchronous, in-process task invocation.

use std::sync::Arc;

use jsonschema::Validator;
use tessel_core::task::{TaskKind, TaskType};
use tessel_core::{
    Error, ErrorKind, ParameterSchema, Parameters, Result, RunContext, TaskAction,
};

use super::{ToolExecutor, ToolOutput};
use crate::{TRACING_TARGET_TOOL, placeholder, schema};

/// Executor of a task action bound as a tool.
///
/// Holds only bind-time state; every call works on a freshly merged parameter
/// map, so one invoker can serve concurrent calls.
pub struct TaskInvoker {
    action: TaskAction,
    task_type: Arc<dyn TaskType>,
    presets: Parameters,
    projected: ParameterSchema,
    validator: Validator,
}

impl TaskInvoker {
    /// Prepares the invoker of `action`, run by `task_type`.
    ///
    /// Fails with [`ErrorKind::UnsupportedAction`] unless the type runs to
    /// completion in-process.
    pub fn new(action: TaskAction, task_type: Arc<dyn TaskType>) -> Result<Self> {
        if task_type.kind() != TaskKind::Runnable {
            return Err(Error::unsupported_action(format!(
                "task '{}' has {} type '{}', only runnable tasks can be bound as tools",
                action.id,
                task_type.kind(),
                task_type.type_name()
            )));
        }

        let full_schema = task_type.schema().to_value();
        let validator = Validator::new(&full_schema).map_err(|e| {
            Error::configuration(format!(
                "schema of task type '{}' is not a valid JSON Schema: {e}",
                task_type.type_name()
            ))
        })?;

        Ok(Self {
            presets: placeholder::resolved(&action.parameters),
            projected: schema::project(task_type.schema(), &action.parameters),
            action,
            task_type,
            validator,
        })
    }

    /// Returns the bound action.
    pub fn action(&self) -> &TaskAction {
        &self.action
    }

    /// Returns the schema exposed to the model.
    pub fn projected_schema(&self) -> &ParameterSchema {
        &self.projected
    }

    /// Returns the description exposed to the model, if any.
    pub fn description(&self) -> Option<&str> {
        self.action
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| self.task_type.description())
    }

    /// Overlays call arguments on the presets.
    ///
    /// Only keys exposed by the projected schema are taken from `arguments`;
    /// the rest are ignored. The result must satisfy the full required set.
    pub fn merge(&self, arguments: Parameters) -> Result<Parameters> {
        let mut merged = self.presets.clone();

        for (name, value) in arguments {
            if self.projected.has_property(&name) {
                merged.insert(name, value);
            } else {
                tracing::debug!(
                    target: TRACING_TARGET_TOOL,
                    task_id = %self.action.id,
                    argument = %name,
                    "Ignoring argument not exposed to the model"
                );
            }
        }

        if let Some(missing) = self
            .task_type
            .schema()
            .required()
            .iter()
            .find(|name| !merged.contains_key(name.as_str()))
        {
            return Err(Error::missing_input(missing));
        }

        Ok(merged)
    }

    fn validate(&self, merged: &Parameters) -> Result<()> {
        let instance = serde_json::Value::Object(merged.clone());
        let errors: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|e| e.to_string())
            .collect();

        if errors.is_empty() {
            return Ok(());
        }

        Err(Error::invalid_arguments(format!(
            "arguments of task '{}' do not match its schema: {}",
            self.action.id,
            errors.join("; ")
        )))
    }
}

#[async_trait::async_trait]
impl ToolExecutor for TaskInvoker {
    #[tracing::instrument(
        target = TRACING_TARGET_TOOL,
        skip_all,
        fields(task_id = %self.action.id, task_type = %self.action.task_type)
    )]
    async fn execute(&self, arguments: Parameters, ctx: &RunContext) -> Result<ToolOutput> {
        let merged = self.merge(arguments)?;
        self.validate(&merged)?;

        let output = self
            .task_type
            .execute(merged, ctx)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::InvalidArguments | ErrorKind::MissingInput | ErrorKind::Execution => e,
                _ => Error::execution(format!("task '{}' failed", self.action.id)).with_source(e),
            })?;

        let output = ToolOutput::from(output);
        tracing::debug!(
            target: TRACING_TARGET_TOOL,
            success = output.is_success(),
            "Task completed"
        );
        Ok(output)
    }
}

impl std::fmt::Debug for TaskInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskInvoker")
            .field("action", &self.action)
            .field("task_type", &self.task_type.type_name())
            .field("projected", &self.projected)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;
    use tessel_core::task::builtin::{Return, Sequential};
    use tessel_core::task::{RunnableTask, TaskAdapter, TaskOutput};

    use super::*;

    /// Adds three numbers.
    #[derive(Deserialize, JsonSchema)]
    struct Add {
        a: i64,
        b: i64,
        c: i64,
    }

    #[async_trait::async_trait]
    impl RunnableTask for Add {
        const TYPE: &'static str = "math.add";

        async fn run(self, _ctx: &RunContext) -> Result<TaskOutput> {
            let mut output = Parameters::new();
            output.insert("sum".to_string(), json!(self.a + self.b + self.c));
            Ok(Some(output))
        }
    }

    /// Always fails.
    #[derive(Deserialize, JsonSchema)]
    struct Fail {}

    #[async_trait::async_trait]
    impl RunnableTask for Fail {
        const TYPE: &'static str = "test.fail";

        async fn run(self, _ctx: &RunContext) -> Result<TaskOutput> {
            Err(Error::not_found("upstream record vanished"))
        }
    }

    fn params(value: serde_json::Value) -> Parameters {
        value.as_object().cloned().unwrap()
    }

    fn add_invoker() -> TaskInvoker {
        let action = TaskAction::new("add", Add::TYPE)
            .with_parameter("a", 5)
            .with_parameter("b", "...");
        TaskInvoker::new(action, Arc::new(TaskAdapter::<Add>::new().unwrap())).unwrap()
    }

    #[test]
    fn projects_open_parameters() {
        let invoker = add_invoker();
        let names: Vec<&String> = invoker.projected_schema().properties().keys().collect();
        assert_eq!(names, ["b", "c"]);
        assert_eq!(
            invoker.projected_schema().required(),
            ["b".to_string(), "c".to_string()]
        );
        assert_eq!(invoker.description(), Some("Adds three numbers."));
    }

    #[test]
    fn merge_ignores_unexposed_arguments() {
        let invoker = add_invoker();

        let merged = invoker.merge(params(json!({ "b": 7, "c": 1 }))).unwrap();
        assert_eq!(merged, params(json!({ "a": 5, "b": 7, "c": 1 })));

        let merged = invoker
            .merge(params(json!({ "a": 9, "b": 7, "c": 1 })))
            .unwrap();
        assert_eq!(merged["a"], 5);
    }

    #[test]
    fn merge_fails_on_missing_required() {
        let error = add_invoker()
            .merge(params(json!({ "b": 7 })))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MissingInput);
        assert_eq!(error.field.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn executes_and_returns_json() {
        let output = add_invoker()
            .execute(params(json!({ "b": 7, "c": 1 })), &RunContext::new())
            .await
            .unwrap();
        assert_eq!(output.to_value(), json!({ "sum": 13 }));
    }

    #[tokio::test]
    async fn concurrent_calls_keep_arguments_apart() {
        let invoker = add_invoker();
        let ctx = RunContext::new();

        let (first, second) = futures::join!(
            invoker.execute(params(json!({ "b": 1, "c": 1 })), &ctx),
            invoker.execute(params(json!({ "b": 100, "c": 10 })), &ctx),
        );

        assert_eq!(first.unwrap().to_value(), json!({ "sum": 7 }));
        assert_eq!(second.unwrap().to_value(), json!({ "sum": 115 }));
        assert_eq!(invoker.action().parameters["b"], "...");
    }

    #[tokio::test]
    async fn schema_violation_is_an_argument_error() {
        let error = add_invoker()
            .execute(params(json!({ "b": "seven", "c": 1 })), &RunContext::new())
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidArguments);
    }

    #[tokio::test]
    async fn task_failure_aborts_as_execution_error() {
        let invoker = TaskInvoker::new(
            TaskAction::new("fail", Fail::TYPE),
            Arc::new(TaskAdapter::<Fail>::new().unwrap()),
        )
        .unwrap();

        let error = invoker
            .execute(Parameters::new(), &RunContext::new())
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Execution);
    }

    #[test]
    fn rejects_flowable_types() {
        let error = TaskInvoker::new(
            TaskAction::new("seq", Sequential::TYPE),
            Arc::new(Sequential::new()),
        )
        .unwrap_err();
        assert_eq!(error.kind, ErrorKind::UnsupportedAction);
    }

    #[test]
    fn description_override_wins() {
        let invoker = TaskInvoker::new(
            TaskAction::new("ret", "core.return").with_description("Echoes a value."),
            Arc::new(TaskAdapter::<Return>::new().unwrap()),
        )
        .unwrap();
        assert_eq!(invoker.description(), Some("Echoes a value."));
    }
}
