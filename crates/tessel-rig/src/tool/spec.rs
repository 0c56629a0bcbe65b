//! LLM-facing tool specifications.

use serde::{Serialize, Serializer};
use serde_json::Value;
use tessel_core::ParameterSchema;

/// Name, description and projected parameter schema of a bound tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpecification {
    name: String,
    description: String,
    parameters: ParameterSchema,
}

impl ToolSpecification {
    /// Creates a new tool specification.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ParameterSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the projected parameter schema.
    pub fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    /// Returns the wire shape `{name, description, parameters}`.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters.to_value(),
        })
    }

    /// Converts to OpenAI function format.
    pub fn to_openai_function(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters.to_value()
            }
        })
    }

    /// Converts to Anthropic tool format.
    pub fn to_anthropic_tool(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.parameters.to_value()
        })
    }

    /// Converts to a rig tool definition.
    pub fn to_rig_definition(&self) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.to_value(),
        }
    }
}

impl Serialize for ToolSpecification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
