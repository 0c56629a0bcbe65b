//! Flow definitions targeted by flow tools.

mod repository;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display};

pub use self::repository::{FlowRepository, InMemoryFlowRepository};
use crate::action::ParameterSchema;
use crate::label::Labels;

/// Static definition of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDefinition {
    /// Namespace the flow belongs to.
    pub namespace: String,
    /// Flow identifier, unique within the namespace.
    pub id: String,
    /// Revision number.
    #[serde(default = "default_revision")]
    pub revision: u32,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared inputs.
    #[serde(default)]
    pub inputs: Vec<FlowInput>,
    /// Labels declared by the flow itself.
    #[serde(default)]
    pub labels: Labels,
    /// Disabled flows cannot be started.
    #[serde(default)]
    pub disabled: bool,
}

fn default_revision() -> u32 {
    1
}

impl FlowDefinition {
    /// Creates a flow definition at revision 1.
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
            revision: default_revision(),
            description: None,
            inputs: Vec::new(),
            labels: Labels::default(),
            disabled: false,
        }
    }

    /// Sets the revision.
    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision = revision;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares an input.
    pub fn with_input(mut self, input: FlowInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Declares a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(crate::Label::new(key, value));
        self
    }

    /// Returns a declared input.
    pub fn input(&self, id: &str) -> Option<&FlowInput> {
        self.inputs.iter().find(|i| i.id == id)
    }

    /// Returns the description if it is not blank.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Returns `namespace.id`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.id)
    }

    /// Builds the parameter schema of the flow's inputs.
    ///
    /// Inputs that are required and have no default are required in the schema.
    pub fn inputs_schema(&self) -> ParameterSchema {
        self.inputs
            .iter()
            .fold(ParameterSchema::new(), |schema, input| {
                let schema = schema.with_property(&input.id, input.json_schema());
                if input.is_mandatory() {
                    schema.with_required(&input.id)
                } else {
                    schema
                }
            })
    }
}

/// An input declared by a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowInput {
    /// Input identifier.
    pub id: String,
    /// Declared type.
    #[serde(rename = "type", default)]
    pub input_type: InputType,
    /// Whether a value must be supplied.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Value used when none is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Value>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_required() -> bool {
    true
}

impl FlowInput {
    /// Creates a required input.
    pub fn new(id: impl Into<String>, input_type: InputType) -> Self {
        Self {
            id: id.into(),
            input_type,
            required: default_required(),
            defaults: None,
            description: None,
        }
    }

    /// Makes the input optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the default value.
    pub fn with_defaults(mut self, defaults: impl Into<Value>) -> Self {
        self.defaults = Some(defaults.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns whether a value must be supplied by the caller.
    pub fn is_mandatory(&self) -> bool {
        self.required && self.defaults.is_none()
    }

    /// Returns the JSON Schema describing this input.
    pub fn json_schema(&self) -> Value {
        let mut schema = self.input_type.json_schema();
        if let (Some(description), Some(object)) = (&self.description, schema.as_object_mut()) {
            object.insert("description".to_string(), description.clone().into());
        }
        schema
    }
}

/// Type of a flow input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum InputType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Json,
    Array,
    Datetime,
}

impl InputType {
    /// Returns the JSON Schema of this type.
    pub fn json_schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Int => json!({ "type": "integer" }),
            Self::Float => json!({ "type": "number" }),
            Self::Bool => json!({ "type": "boolean" }),
            Self::Json => json!({}),
            Self::Array => json!({ "type": "array" }),
            Self::Datetime => json!({ "type": "string", "format": "date-time" }),
        }
    }

    /// Returns whether a JSON value is acceptable for this type.
    ///
    /// Only the JSON shape is checked; string contents are not parsed.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String | Self::Datetime => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Json => true,
            Self::Array => value.is_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_schema_requires_mandatory_inputs_only() {
        let flow = FlowDefinition::new("company.team", "report")
            .with_input(FlowInput::new("date", InputType::Datetime).with_description("Day"))
            .with_input(FlowInput::new("format", InputType::String).with_defaults("pdf"))
            .with_input(FlowInput::new("notify", InputType::Bool).optional());

        let schema = flow.inputs_schema();
        assert_eq!(schema.properties().len(), 3);
        assert_eq!(schema.required(), ["date".to_string()]);
        assert_eq!(schema.property("date").unwrap()["description"], "Day");
        assert_eq!(schema.property("date").unwrap()["format"], "date-time");
    }

    #[test]
    fn input_type_accepts() {
        assert!(InputType::Int.accepts(&json!(3)));
        assert!(!InputType::Int.accepts(&json!(3.5)));
        assert!(InputType::Float.accepts(&json!(3)));
        assert!(!InputType::String.accepts(&json!(3)));
        assert!(InputType::Json.accepts(&json!({ "a": [1] })));
    }

    #[test]
    fn deserializes_with_defaults() {
        let flow: FlowDefinition = serde_json::from_value(json!({
            "namespace": "company.team",
            "id": "report",
            "inputs": [{ "id": "day", "type": "DATETIME" }],
            "labels": { "env": "stage" }
        }))
        .unwrap();

        assert_eq!(flow.revision, 1);
        assert!(flow.inputs[0].required);
        assert_eq!(flow.inputs[0].input_type, InputType::Datetime);
        assert_eq!(flow.labels.get("env"), Some("stage"));
        assert_eq!(flow.full_name(), "company.team.report");
    }
}
