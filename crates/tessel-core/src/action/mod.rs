//! Statically configured actions that can be exposed as tools.
//!
//! An [`ActionDefinition`] is authored once per workflow and stays immutable for
//! the duration of a conversation turn. Preset parameter values may carry the
//! placeholder sentinel `"..."`, which leaves the parameter open for the model.

mod schema;

use derive_more::From;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use self::schema::ParameterSchema;
use crate::label::Labels;

/// Top-level parameter map of an action or a tool call.
pub type Parameters = Map<String, Value>;

/// A preconfigured action, one variant per action kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDefinition {
    /// A single in-process task.
    Task(TaskAction),
    /// A sub-flow submitted for asynchronous execution.
    Flow(FlowAction),
}

impl ActionDefinition {
    /// Returns a short human-readable identity used in logs.
    pub fn identity(&self) -> String {
        match self {
            Self::Task(task) => format!("task:{}", task.id),
            Self::Flow(flow) => match (&flow.namespace, &flow.flow_id) {
                (Some(namespace), Some(flow_id)) => format!("flow:{namespace}.{flow_id}"),
                _ => "flow:*".to_string(),
            },
        }
    }
}

/// A task exposed as a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAction {
    /// Task identifier, unique within the owning workflow.
    pub id: String,
    /// Registered task type name.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Overrides the task type's own description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Preset parameter values.
    #[serde(default)]
    pub parameters: Parameters,
}

impl TaskAction {
    /// Creates a task action without presets.
    pub fn new(id: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task_type: task_type.into(),
            description: None,
            parameters: Parameters::new(),
        }
    }

    /// Sets the description override.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Presets a parameter value.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// A flow call exposed as a tool.
///
/// When both `namespace` and `flow_id` are set the target is fixed at bind time
/// (explicit mode); when neither is set the model names the target on every
/// call (open mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowAction {
    /// Target namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Target flow identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    /// Target revision; latest when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,
    /// Overrides the target flow's description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether labels of the invoking execution are inherited.
    #[serde(default = "default_inherit_labels")]
    pub inherit_labels: bool,
    /// Predefined inputs.
    #[serde(default)]
    pub inputs: Parameters,
    /// Predefined labels.
    #[serde(default)]
    pub labels: Labels,
    /// Predefined schedule date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<Timestamp>,
}

fn default_inherit_labels() -> bool {
    true
}

impl FlowAction {
    /// Creates an explicit-mode flow action.
    pub fn explicit(namespace: impl Into<String>, flow_id: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            flow_id: Some(flow_id.into()),
            ..Self::open()
        }
    }

    /// Creates an open-mode flow action.
    pub fn open() -> Self {
        Self {
            namespace: None,
            flow_id: None,
            revision: None,
            description: None,
            inherit_labels: default_inherit_labels(),
            inputs: Parameters::new(),
            labels: Labels::default(),
            schedule_date: None,
        }
    }

    /// Sets the description override.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Enables or disables label inheritance.
    pub fn with_inherit_labels(mut self, inherit: bool) -> Self {
        self.inherit_labels = inherit;
        self
    }

    /// Predefines an input.
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Predefines a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(crate::Label::new(key, value));
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_tagged_actions() {
        let actions: Vec<ActionDefinition> = serde_json::from_value(json!([
            {
                "kind": "task",
                "id": "greet",
                "type": "core.log",
                "parameters": { "message": "..." }
            },
            {
                "kind": "flow",
                "namespace": "company.team",
                "flowId": "report",
                "labels": { "team": "data" }
            },
            { "kind": "flow", "inheritLabels": false }
        ]))
        .unwrap();

        let ActionDefinition::Task(task) = &actions[0] else {
            panic!("expected a task action");
        };
        assert_eq!(task.task_type, "core.log");
        assert_eq!(task.parameters["message"], "...");

        let ActionDefinition::Flow(flow) = &actions[1] else {
            panic!("expected a flow action");
        };
        assert!(flow.inherit_labels);
        assert_eq!(flow.labels.get("team"), Some("data"));
        assert_eq!(actions[1].identity(), "flow:company.team.report");

        let ActionDefinition::Flow(open) = &actions[2] else {
            panic!("expected a flow action");
        };
        assert!(!open.inherit_labels);
        assert_eq!(actions[2].identity(), "flow:*");
    }
}
