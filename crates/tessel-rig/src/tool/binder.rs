//! Binding of configured actions to tools.

use std::sync::Arc;

use tessel_core::execution::ExecutionIntake;
use tessel_core::flow::FlowRepository;
use tessel_core::task::TaskRegistry;
use tessel_core::{ActionDefinition, Error, FlowAction, Result, TaskAction};

use super::name::task_tool_name;
use super::{BoundTool, FlowInvoker, TaskInvoker, ToolSet, ToolSpecification};
use crate::TRACING_TARGET_TOOL;

/// Binds actions to tools.
///
/// Task actions are resolved against a [`TaskRegistry`]; flow actions need a
/// [`FlowRepository`] and an [`ExecutionIntake`].
#[derive(Clone)]
pub struct ToolBinder {
    tasks: TaskRegistry,
    flows: Option<Arc<dyn FlowRepository>>,
    intake: Option<Arc<dyn ExecutionIntake>>,
}

impl ToolBinder {
    /// Creates a binder for task actions of the given registry.
    pub fn new(tasks: TaskRegistry) -> Self {
        Self {
            tasks,
            flows: None,
            intake: None,
        }
    }

    /// Sets the repository flow actions are resolved against.
    pub fn with_flows(mut self, flows: impl FlowRepository + 'static) -> Self {
        self.flows = Some(Arc::new(flows));
        self
    }

    /// Sets the intake flow executions are submitted to.
    pub fn with_intake(mut self, intake: impl ExecutionIntake + 'static) -> Self {
        self.intake = Some(Arc::new(intake));
        self
    }

    /// Returns the task registry.
    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Binds a task action.
    pub fn bind_task(&self, action: &TaskAction) -> Result<BoundTool> {
        let task_type = self.tasks.get(&action.task_type).ok_or_else(|| {
            Error::configuration(format!(
                "task '{}' uses unknown type '{}'",
                action.id, action.task_type
            ))
        })?;

        let invoker = TaskInvoker::new(action.clone(), task_type)?;
        let description = invoker.description().ok_or_else(|| {
            Error::configuration(format!(
                "task '{}' has no description and its type '{}' does not declare one",
                action.id, action.task_type
            ))
        })?;

        let spec = ToolSpecification::new(
            task_tool_name(&action.id),
            description,
            invoker.projected_schema().clone(),
        );

        Ok(BoundTool::new(spec, Arc::new(invoker)))
    }

    /// Binds a flow action.
    pub async fn bind_flow(&self, action: &FlowAction) -> Result<BoundTool> {
        let (Some(flows), Some(intake)) = (&self.flows, &self.intake) else {
            return Err(Error::configuration(
                "flow actions need a flow repository and an execution intake",
            ));
        };

        let (invoker, spec) =
            FlowInvoker::bind(action.clone(), flows.clone(), intake.clone()).await?;
        Ok(BoundTool::new(spec, Arc::new(invoker)))
    }

    /// Binds any action.
    pub async fn bind(&self, action: &ActionDefinition) -> Result<BoundTool> {
        let tool = match action {
            ActionDefinition::Task(task) => self.bind_task(task)?,
            ActionDefinition::Flow(flow) => self.bind_flow(flow).await?,
        };

        tracing::debug!(
            target: TRACING_TARGET_TOOL,
            action = %action.identity(),
            tool = %tool.name(),
            "Action bound"
        );
        Ok(tool)
    }

    /// Binds every action into a new tool set.
    ///
    /// Fails on the first action that cannot be bound or whose tool name is
    /// already taken.
    pub async fn bind_all<'a>(
        &self,
        actions: impl IntoIterator<Item = &'a ActionDefinition>,
    ) -> Result<ToolSet> {
        let mut tools = ToolSet::new();
        for action in actions {
            tools.insert(self.bind(action).await?)?;
        }

        tracing::info!(
            target: TRACING_TARGET_TOOL,
            tool_count = tools.len(),
            "Tools bound"
        );
        Ok(tools)
    }
}

impl std::fmt::Debug for ToolBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolBinder")
            .field("tasks", &self.tasks)
            .field("flows", &self.flows.is_some())
            .field("intake", &self.intake.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tessel_core::execution::InMemoryIntake;
    use tessel_core::flow::{FlowDefinition, InMemoryFlowRepository};
    use tessel_core::task::builtin::Sequential;
    use tessel_core::{ErrorKind, FlowAction};

    use super::*;

    fn binder() -> ToolBinder {
        let flows: InMemoryFlowRepository =
            [FlowDefinition::new("team", "report").with_description("Builds a report.")]
                .into_iter()
                .collect();

        ToolBinder::new(TaskRegistry::with_builtins().unwrap())
            .with_flows(flows)
            .with_intake(InMemoryIntake::new())
    }

    #[test]
    fn binds_task_with_projected_schema() {
        let action = TaskAction::new("greet", "core.log").with_parameter("level", "WARN");
        let tool = binder().bind_task(&action).unwrap();

        assert!(tool.name().starts_with("task_greet_"));
        assert_eq!(
            tool.spec().description(),
            "Logs a message in the execution's log stream."
        );
        assert!(tool.spec().parameters().has_property("message"));
        assert!(!tool.spec().parameters().has_property("level"));
        assert_eq!(binder().bind_task(&action).unwrap().name(), tool.name());
    }

    #[test]
    fn rejects_unbindable_tasks() {
        let unknown = binder()
            .bind_task(&TaskAction::new("x", "core.unknown"))
            .unwrap_err();
        assert!(unknown.is_configuration());

        let flowable = binder()
            .bind_task(&TaskAction::new("seq", Sequential::TYPE))
            .unwrap_err();
        assert_eq!(flowable.kind, ErrorKind::UnsupportedAction);
    }

    #[tokio::test]
    async fn bind_all_rejects_duplicate_names() {
        let actions = vec![
            ActionDefinition::Task(TaskAction::new("echo", "core.return")),
            ActionDefinition::Task(
                TaskAction::new("echo", "core.return").with_parameter("format", json!("x")),
            ),
        ];

        let error = binder().bind_all(&actions).await.unwrap_err();
        assert!(error.is_configuration());
    }

    #[tokio::test]
    async fn bind_all_mixes_tasks_and_flows() {
        let actions = vec![
            ActionDefinition::Task(TaskAction::new("echo", "core.return")),
            ActionDefinition::Flow(FlowAction::explicit("team", "report")),
            ActionDefinition::Flow(FlowAction::open()),
        ];

        let tools = binder().bind_all(&actions).await.unwrap();
        assert_eq!(tools.len(), 3);
        assert!(tools.contains("call_flow"));
    }

    #[tokio::test]
    async fn flows_need_repository_and_intake() {
        let binder = ToolBinder::new(TaskRegistry::new());
        let error = binder.bind_flow(&FlowAction::open()).await.unwrap_err();
        assert!(error.is_configuration());
    }
}
