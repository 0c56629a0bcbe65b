//! Parameter schemas of actions.

use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::{Error, Result};

/// Top-level JSON Schema of an action's parameters.
///
/// Only the top level is modelled: `properties` maps parameter names to their
/// (opaque) sub-schemas and `required` lists mandatory names in order. Nested
/// `items`/`properties` stay inside the sub-schema values untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParameterSchema {
    /// Human-readable description of the action type.
    #[serde(default)]
    description: Option<String>,
    /// Parameter name to sub-schema.
    #[serde(default)]
    properties: Map<String, Value>,
    /// Names of mandatory parameters.
    #[serde(default)]
    required: Vec<String>,
}

impl ParameterSchema {
    /// Creates an empty object schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the schema of a Rust type.
    ///
    /// The type's doc comment becomes the schema description. Sub-schemas are
    /// inlined so that every property is self-contained.
    pub fn for_type<T: JsonSchema>() -> Result<Self> {
        let mut settings = SchemaSettings::draft07();
        settings.inline_subschemas = true;
        let mut generator = settings.into_generator();
        let schema = generator.root_schema_for::<T>();
        let value = serde_json::to_value(&schema)?;
        Self::from_value(&value)
    }

    /// Parses an object schema from its JSON representation.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::configuration("parameter schema must be a JSON object"));
        }

        serde_json::from_value(value.clone()).map_err(|e| {
            Error::configuration(format!("invalid parameter schema: {e}")).with_source(e)
        })
    }

    /// Adds a property.
    pub fn with_property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Marks a property as required.
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Returns all properties.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Returns a property's sub-schema.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns whether the schema declares a property.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Returns the required property names, in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Returns whether a property is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Returns the JSON Schema object.
    pub fn to_value(&self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}

impl Serialize for ParameterSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
