//! Asynchronous flow invocation.
//!
//! A flow tool never waits for the flow it starts: it reconciles labels and
//! inputs, submits an [`ExecutionRecord`] to the [`ExecutionIntake`] and
//! answers with the accepted [`ExecutionDescriptor`].
//!
//! [`ExecutionDescriptor`]: tessel_core::execution::ExecutionDescriptor

mod args;
mod inputs;
mod labels;

use std::sync::Arc;

use tessel_core::execution::{ExecutionIntake, ExecutionRecord, ParentExecution};
use tessel_core::flow::{FlowDefinition, FlowRepository};
use tessel_core::{Error, ErrorKind, FlowAction, Parameters, Result, RunContext};

use self::args::FlowCallArgs;
use super::name::{OPEN_FLOW_TOOL_NAME, flow_tool_name};
use super::{ToolExecutor, ToolOutput, ToolSpecification};
use crate::TRACING_TARGET_TOOL;

/// Description of the open-mode tool when the action does not override it.
const OPEN_FLOW_DESCRIPTION: &str = "Starts an execution of a flow. Name the flow with \
    `namespace` and `flowId`, and pass its inputs, optional labels and an optional \
    schedule date. Returns the created execution without waiting for it to finish.";

/// Target of a flow tool.
#[derive(Debug, Clone)]
enum FlowTarget {
    /// Resolved at bind time.
    Explicit(FlowDefinition),
    /// Named by the model on every call.
    Open,
}

/// Executor of a flow action bound as a tool.
pub struct FlowInvoker {
    name: String,
    action: FlowAction,
    target: FlowTarget,
    flows: Arc<dyn FlowRepository>,
    intake: Arc<dyn ExecutionIntake>,
}

impl FlowInvoker {
    /// Prepares the invoker of `action` and the specification exposed for it.
    ///
    /// The action is in explicit mode when both `namespace` and `flowId` are
    /// set, in open mode when neither is set; anything else is a
    /// configuration error.
    pub async fn bind(
        action: FlowAction,
        flows: Arc<dyn FlowRepository>,
        intake: Arc<dyn ExecutionIntake>,
    ) -> Result<(Self, ToolSpecification)> {
        labels::check_predefined(&action.labels)?;

        let (target, spec) = match (&action.namespace, &action.flow_id) {
            (Some(namespace), Some(flow_id)) => {
                let flow = flows
                    .find(namespace, flow_id, action.revision)
                    .await?
                    .ok_or_else(|| {
                        Error::configuration(format!(
                            "flow '{namespace}.{flow_id}' does not exist"
                        ))
                    })?;
                let spec = Self::explicit_spec(&action, &flow)?;
                (FlowTarget::Explicit(flow), spec)
            }
            (None, None) => {
                let description =
                    override_description(&action).unwrap_or(OPEN_FLOW_DESCRIPTION);
                let spec =
                    ToolSpecification::new(OPEN_FLOW_TOOL_NAME, description, args::open_schema());
                (FlowTarget::Open, spec)
            }
            _ => {
                return Err(Error::configuration(
                    "namespace and flowId of a flow action must be set together",
                ));
            }
        };

        let invoker = Self {
            name: spec.name().to_string(),
            action,
            target,
            flows,
            intake,
        };
        Ok((invoker, spec))
    }

    fn explicit_spec(action: &FlowAction, flow: &FlowDefinition) -> Result<ToolSpecification> {
        if flow.disabled {
            return Err(Error::configuration(format!(
                "flow '{}' is disabled",
                flow.full_name()
            )));
        }

        inputs::check_predefined(flow, &action.inputs)?;

        let description = override_description(action)
            .or_else(|| flow.description())
            .ok_or_else(|| {
                Error::configuration(format!(
                    "flow '{}' has no description and the action does not provide one",
                    flow.full_name()
                ))
            })?;

        Ok(ToolSpecification::new(
            flow_tool_name(&flow.namespace, &flow.id),
            description,
            args::explicit_schema(flow, &action.inputs),
        ))
    }

    /// Returns the bound action.
    pub fn action(&self) -> &FlowAction {
        &self.action
    }

    /// Returns whether the model names the target flow on every call.
    pub fn is_open(&self) -> bool {
        matches!(self.target, FlowTarget::Open)
    }

    async fn resolve(&self, args: &FlowCallArgs) -> Result<FlowDefinition> {
        let flow = match &self.target {
            FlowTarget::Explicit(flow) => return Ok(flow.clone()),
            FlowTarget::Open => {
                let namespace = args
                    .namespace
                    .as_deref()
                    .ok_or_else(|| Error::missing_input("namespace"))?;
                let flow_id = args
                    .flow_id
                    .as_deref()
                    .ok_or_else(|| Error::missing_input("flowId"))?;

                self.flows
                    .find(namespace, flow_id, args.revision)
                    .await?
                    .ok_or_else(|| {
                        Error::not_found(format!("flow '{namespace}.{flow_id}' does not exist"))
                            .with_field("flowId")
                    })?
            }
        };

        if flow.disabled {
            return Err(Error::invalid_arguments(format!(
                "flow '{}' is disabled",
                flow.full_name()
            ))
            .with_field("flowId"));
        }

        Ok(flow)
    }

    /// Builds the execution record of one call without submitting it.
    pub async fn prepare(
        &self,
        arguments: Parameters,
        ctx: &RunContext,
    ) -> Result<ExecutionRecord> {
        let args = FlowCallArgs::parse(&self.name, arguments)?;
        let target = self.resolve(&args).await?;

        let labels = labels::effective(
            ctx.labels(),
            &target,
            self.action.inherit_labels,
            &self.action.labels,
            args.labels.clone().unwrap_or_default(),
        )?;

        let inputs = inputs::effective(
            &target,
            &self.action.inputs,
            args.inputs.clone().unwrap_or_default(),
        )?;

        let schedule_date = args.schedule_date()?.or(self.action.schedule_date);

        let mut record = ExecutionRecord::new(&target.namespace, &target.id, target.revision)
            .with_inputs(inputs)
            .with_labels(labels);

        if let Some(date) = schedule_date {
            record = record.scheduled_for(date);
        }

        if let (Some(execution_id), Some(namespace), Some(flow_id)) =
            (ctx.execution_id(), ctx.namespace(), ctx.flow_id())
        {
            record = record.with_parent(ParentExecution {
                execution_id,
                namespace: namespace.to_string(),
                flow_id: flow_id.to_string(),
            });
        }

        Ok(record)
    }
}

fn override_description(action: &FlowAction) -> Option<&str> {
    action
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
}

#[async_trait::async_trait]
impl ToolExecutor for FlowInvoker {
    #[tracing::instrument(
        target = TRACING_TARGET_TOOL,
        skip_all,
        fields(open = self.is_open())
    )]
    async fn execute(&self, arguments: Parameters, ctx: &RunContext) -> Result<ToolOutput> {
        let record = self.prepare(arguments, ctx).await?;
        let execution_id = record.id;
        let full_name = format!("{}.{}", record.namespace, record.flow_id);

        let descriptor = self.intake.submit(record).await.map_err(|e| {
            if e.kind == ErrorKind::Submission {
                e
            } else {
                Error::submission(format!("cannot submit execution of '{full_name}'"))
                    .with_source(e)
            }
        })?;

        tracing::info!(
            target: TRACING_TARGET_TOOL,
            %execution_id,
            flow = %full_name,
            state = %descriptor.state,
            "Flow execution submitted"
        );

        ToolOutput::from_serialize(&descriptor)
    }
}

impl std::fmt::Debug for FlowInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowInvoker")
            .field("name", &self.name)
            .field("action", &self.action)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
