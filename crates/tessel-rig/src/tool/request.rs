//! Tool invocation requests issued by the chat loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessel_core::{Error, Parameters, Result};

/// A tool call made by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// Name of the tool being called.
    pub name: String,
    /// Arguments as a JSON object, or as a string holding one.
    #[serde(default)]
    pub arguments: Value,
    /// Id correlating the call with its response.
    #[serde(default)]
    pub id: String,
}

impl ToolInvocationRequest {
    /// Creates a new request.
    pub fn new(name: impl Into<String>, arguments: Value, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: id.into(),
        }
    }

    /// Decodes the arguments into a parameter map.
    ///
    /// Missing (`null`) arguments decode to an empty map. Providers that send
    /// arguments as serialized text are accepted as well.
    pub fn arguments(&self) -> Result<Parameters> {
        match &self.arguments {
            Value::Null => Ok(Parameters::new()),
            Value::Object(arguments) => Ok(arguments.clone()),
            Value::String(text) if text.trim().is_empty() => Ok(Parameters::new()),
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(arguments)) => Ok(arguments),
                Ok(_) => Err(not_an_object(&self.name)),
                Err(e) => Err(Error::invalid_arguments(format!(
                    "arguments of '{}' are not valid JSON",
                    self.name
                ))
                .with_source(e)),
            },
            _ => Err(not_an_object(&self.name)),
        }
    }
}

fn not_an_object(tool: &str) -> Error {
    Error::invalid_arguments(format!("arguments of '{tool}' must be a JSON object"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn decodes_objects_and_text() {
        let object = ToolInvocationRequest::new("t", json!({ "b": 7 }), "1");
        assert_eq!(object.arguments().unwrap()["b"], 7);

        let text = ToolInvocationRequest::new("t", json!("{\"b\": 7}"), "1");
        assert_eq!(text.arguments().unwrap()["b"], 7);

        let empty = ToolInvocationRequest::new("t", Value::Null, "1");
        assert!(empty.arguments().unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_arguments() {
        for arguments in [json!([1]), json!("{not json"), json!("[1]"), json!(3)] {
            let request = ToolInvocationRequest::new("t", arguments, "1");
            let error = request.arguments().unwrap_err();
            assert_eq!(error.kind, ErrorKind::InvalidArguments);
        }
    }

    #[test]
    fn deserializes_wire_shape() {
        let request: ToolInvocationRequest =
            serde_json::from_value(json!({ "name": "t", "arguments": {}, "id": "call_1" }))
                .unwrap();
        assert_eq!(request.id, "call_1");
    }
}
