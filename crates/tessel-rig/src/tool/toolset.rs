//! Set of tools bound for one conversation turn.

use std::collections::HashMap;

use tessel_core::{Error, Result, RunContext};

use super::{BoundTool, RigTool, ToolInvocationRequest, ToolResponse, ToolSpecification};
use crate::TRACING_TARGET_TOOL;

/// Tools of a turn, in binding order, with unique names.
#[derive(Default, Clone)]
pub struct ToolSet {
    tools: Vec<BoundTool>,
    index: HashMap<String, usize>,
}

impl ToolSet {
    /// Creates a new empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool.
    ///
    /// Fails with a configuration error if the name is already taken.
    pub fn insert(&mut self, tool: BoundTool) -> Result<()> {
        if self.index.contains_key(tool.name()) {
            return Err(Error::configuration(format!(
                "tool name '{}' is bound more than once",
                tool.name()
            ))
            .with_field(tool.name()));
        }

        self.index.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Returns a tool by name.
    pub fn get(&self, name: &str) -> Option<&BoundTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Returns whether a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns all tools in binding order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundTool> {
        self.tools.iter()
    }

    /// Returns all tool specifications in binding order.
    pub fn specifications(&self) -> Vec<&ToolSpecification> {
        self.tools.iter().map(BoundTool::spec).collect()
    }

    /// Returns all tool definitions in rig format.
    pub fn definitions(&self) -> Vec<rig::completion::ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| tool.spec().to_rig_definition())
            .collect()
    }

    /// Returns rig tools executing within `ctx`.
    pub fn rig_tools(&self, ctx: &RunContext) -> Vec<RigTool> {
        self.tools
            .iter()
            .map(|tool| RigTool::new(tool.clone(), ctx.clone()))
            .collect()
    }

    /// Executes a tool call.
    ///
    /// Unknown tools and malformed arguments are argument errors; any error
    /// is returned to the caller.
    pub async fn invoke(
        &self,
        request: &ToolInvocationRequest,
        ctx: &RunContext,
    ) -> Result<ToolResponse> {
        let tool = self.get(&request.name).ok_or_else(|| {
            Error::not_found(format!("tool '{}' is not available", request.name))
                .with_field("name")
        })?;

        tracing::debug!(
            target: TRACING_TARGET_TOOL,
            tool = %request.name,
            call_id = %request.id,
            "Invoking tool"
        );

        let arguments = request.arguments()?;
        let output = tool.call(arguments, ctx).await?;

        Ok(ToolResponse {
            id: request.id.clone(),
            name: request.name.clone(),
            output,
        })
    }

    /// Returns the number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.tools.iter().map(BoundTool::name).collect::<Vec<_>>())
            .finish()
    }
}
