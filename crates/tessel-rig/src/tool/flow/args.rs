//! Call arguments and parameter schemas of flow tools.

use jiff::Timestamp;
use serde::Deserialize;
use serde_json::{Value, json};
use tessel_core::flow::FlowDefinition;
use tessel_core::{Error, Labels, ParameterSchema, Parameters, Result};

use crate::schema;

/// Arguments of a flow tool call.
///
/// Target fields are only read in open mode.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlowCallArgs {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub flow_id: Option<String>,
    #[serde(default)]
    pub revision: Option<u32>,
    #[serde(default)]
    pub inputs: Option<Parameters>,
    #[serde(default)]
    pub labels: Option<Labels>,
    #[serde(default)]
    pub schedule_date: Option<String>,
}

impl FlowCallArgs {
    /// Decodes the arguments of a call to `tool`.
    pub fn parse(tool: &str, arguments: Parameters) -> Result<Self> {
        serde_json::from_value(Value::Object(arguments)).map_err(|e| {
            Error::invalid_arguments(format!("invalid arguments for '{tool}': {e}")).with_source(e)
        })
    }

    /// Parses the schedule date, if supplied.
    pub fn schedule_date(&self) -> Result<Option<Timestamp>> {
        self.schedule_date
            .as_deref()
            .filter(|date| !date.trim().is_empty())
            .map(|date| {
                date.parse::<Timestamp>().map_err(|e| {
                    Error::invalid_arguments(format!(
                        "'{date}' is not an ISO-8601 timestamp with offset"
                    ))
                    .with_field("scheduleDate")
                    .with_source(e)
                })
            })
            .transpose()
    }
}

fn labels_property() -> Value {
    json!({
        "type": "object",
        "description": "Labels to attach to the execution, as key/value strings",
        "additionalProperties": { "type": "string" }
    })
}

fn schedule_date_property() -> Value {
    json!({
        "type": "string",
        "format": "date-time",
        "description": "ISO-8601 date and time at which the execution should start"
    })
}

/// Builds the schema of an explicit-mode flow tool.
///
/// The `inputs` object exposes the target's inputs left open by `predefined`.
pub(crate) fn explicit_schema(target: &FlowDefinition, predefined: &Parameters) -> ParameterSchema {
    let inputs = schema::project(&target.inputs_schema(), predefined);
    let inputs_property = json!({
        "type": "object",
        "description": "Inputs of the flow",
        "properties": inputs.properties(),
        "required": inputs.required(),
    });

    let schema = ParameterSchema::new()
        .with_property("inputs", inputs_property)
        .with_property("labels", labels_property())
        .with_property("scheduleDate", schedule_date_property());

    if inputs.required().is_empty() {
        schema
    } else {
        schema.with_required("inputs")
    }
}

/// Builds the schema of the open-mode flow tool.
pub(crate) fn open_schema() -> ParameterSchema {
    ParameterSchema::new()
        .with_property(
            "namespace",
            json!({ "type": "string", "description": "Namespace of the flow to start" }),
        )
        .with_property(
            "flowId",
            json!({ "type": "string", "description": "Identifier of the flow to start" }),
        )
        .with_property(
            "revision",
            json!({
                "type": "integer",
                "minimum": 1,
                "description": "Revision of the flow, latest when omitted"
            }),
        )
        .with_property(
            "inputs",
            json!({
                "type": "object",
                "description": "Inputs of the flow, keyed by input id"
            }),
        )
        .with_property("labels", labels_property())
        .with_property("scheduleDate", schedule_date_property())
        .with_required("namespace")
        .with_required("flowId")
}
