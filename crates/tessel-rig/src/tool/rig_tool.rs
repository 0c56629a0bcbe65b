//! rig-core [`Tool`] implementation for bound tools.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde_json::Value;
use tessel_core::{Error, Parameters, RunContext};

use super::BoundTool;

/// A bound tool usable by a rig agent.
///
/// The name reported to rig is the bound tool's own name, not [`Tool::NAME`].
#[derive(Debug, Clone)]
pub struct RigTool {
    tool: BoundTool,
    ctx: RunContext,
}

impl RigTool {
    /// Creates a rig tool executing `tool` within `ctx`.
    pub fn new(tool: BoundTool, ctx: RunContext) -> Self {
        Self { tool, ctx }
    }

    /// Returns the bound tool.
    pub fn bound(&self) -> &BoundTool {
        &self.tool
    }
}

impl Tool for RigTool {
    type Args = Parameters;
    type Error = Error;
    type Output = Value;

    const NAME: &'static str = "tessel_tool";

    fn name(&self) -> String {
        self.tool.name().to_string()
    }

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        self.tool.spec().to_rig_definition()
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let output = self.tool.call(args, &self.ctx).await?;
        Ok(output.to_value())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tessel_core::TaskAction;
    use tessel_core::task::TaskRegistry;

    use super::*;
    use crate::tool::ToolBinder;

    #[tokio::test]
    async fn exposes_bound_tool_to_rig() {
        let binder = ToolBinder::new(TaskRegistry::with_builtins().unwrap());
        let bound = binder
            .bind_task(&TaskAction::new("answer", "core.return"))
            .unwrap();
        let tool = RigTool::new(bound.clone(), RunContext::new());

        assert_eq!(tool.name(), bound.name());
        assert_eq!(tool.definition(String::new()).await.name, bound.name());

        let args = json!({ "format": "42" }).as_object().cloned().unwrap();
        assert_eq!(tool.call(args).await.unwrap(), json!({ "value": "42" }));
    }
}
