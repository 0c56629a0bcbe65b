//! Normalized tool results.

use serde::{Serialize, Serializer};
use serde_json::Value;
use tessel_core::task::TaskOutput;
use tessel_core::{Error, ErrorKind, Parameters, Result};

/// Literal returned to the model when an action produced no output.
pub const SUCCESS: &str = "Success";

/// Result of a tool call as seen by the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Structured output.
    Json(Parameters),
    /// The action completed without output.
    Success,
}

impl ToolOutput {
    /// Serializes a value that must render as a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self::from(Some(map))),
            other => Err(Error::new(ErrorKind::Serialization)
                .with_message(format!("tool output must be a JSON object, got {other}"))),
        }
    }

    /// Returns whether this is the success sentinel.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the wire value: a JSON object or the string `"Success"`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Json(map) => Value::Object(map.clone()),
            Self::Success => Value::String(SUCCESS.to_string()),
        }
    }

    /// Converts to a string representation for the LLM.
    pub fn to_llm_string(&self) -> String {
        match self {
            Self::Json(map) => serde_json::to_string(map).unwrap_or_default(),
            Self::Success => SUCCESS.to_string(),
        }
    }
}

impl From<TaskOutput> for ToolOutput {
    fn from(output: TaskOutput) -> Self {
        match output {
            Some(map) if !map.is_empty() => Self::Json(map),
            _ => Self::Success,
        }
    }
}

impl Serialize for ToolOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Json(map) => map.serialize(serializer),
            Self::Success => serializer.serialize_str(SUCCESS),
        }
    }
}

/// Response to a [`ToolInvocationRequest`](super::ToolInvocationRequest).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    /// Id of the originating call.
    pub id: String,
    /// Name of the called tool.
    pub name: String,
    /// Normalized output.
    pub output: ToolOutput,
}
