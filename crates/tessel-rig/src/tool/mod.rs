//! Workflow actions exposed as LLM tools.
//!
//! The [`ToolBinder`] turns each configured [`ActionDefinition`] into a
//! [`BoundTool`]: a [`ToolSpecification`] (deterministic name, description,
//! schema projected to the parameters left open) paired with exactly one
//! [`ToolExecutor`]. Bound tools are collected in a [`ToolSet`], which
//! dispatches [`ToolInvocationRequest`]s issued by the chat loop.
//!
//! ## Rig-core integration
//!
//! [`RigTool`] implements [`rig::tool::Tool`] so bound tools can be handed
//! to a rig agent, and [`ToolSpecification::to_rig_definition`] renders a
//! [`rig::completion::ToolDefinition`].
//!
//! ## Failure policy
//!
//! Every error is returned to the caller and terminates the tool call; a
//! failing action aborts the turn instead of being reported to the model as a
//! recoverable tool result.
//!
//! [`ActionDefinition`]: tessel_core::ActionDefinition

mod binder;
mod flow;
pub mod name;
mod output;
mod request;
mod rig_tool;
mod spec;
mod task;
mod toolset;

use std::sync::Arc;

pub use binder::ToolBinder;
pub use flow::FlowInvoker;
pub use output::{SUCCESS, ToolOutput, ToolResponse};
pub use request::ToolInvocationRequest;
pub use rig_tool::RigTool;
pub use spec::ToolSpecification;
pub use task::TaskInvoker;
use tessel_core::{Parameters, Result, RunContext};
pub use toolset::ToolSet;

use crate::TRACING_TARGET_TOOL;

/// Executes calls of one bound tool.
#[async_trait::async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Executes one call with decoded arguments.
    async fn execute(&self, arguments: Parameters, ctx: &RunContext) -> Result<ToolOutput>;
}

/// A tool specification paired with its executor.
///
/// Cheap to clone; clones share the executor.
#[derive(Clone)]
pub struct BoundTool {
    spec: ToolSpecification,
    executor: Arc<dyn ToolExecutor>,
}

impl BoundTool {
    /// Pairs a specification with its executor.
    pub fn new(spec: ToolSpecification, executor: Arc<dyn ToolExecutor>) -> Self {
        Self { spec, executor }
    }

    /// Returns the tool specification.
    pub fn spec(&self) -> &ToolSpecification {
        &self.spec
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Executes one call.
    #[tracing::instrument(
        target = TRACING_TARGET_TOOL,
        skip_all,
        fields(tool = %self.spec.name(), argument_count = arguments.len())
    )]
    pub async fn call(&self, arguments: Parameters, ctx: &RunContext) -> Result<ToolOutput> {
        let result = self.executor.execute(arguments, ctx).await;

        if let Err(error) = &result {
            tracing::warn!(
                target: TRACING_TARGET_TOOL,
                kind = error.kind.as_ref(),
                error = %error,
                "Tool call failed"
            );
        }

        result
    }
}

impl std::fmt::Debug for BoundTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundTool")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}
