//! Context of the execution that invokes tools.

use uuid::Uuid;

use crate::label::Labels;
use crate::resource::ResourceScope;

/// Context of the workflow execution serving a conversation turn.
///
/// Carries the identity and labels of the invoking execution (used for label
/// inheritance and parent tracking of submitted flows) and the turn's
/// [`ResourceScope`].
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    execution_id: Option<Uuid>,
    namespace: Option<String>,
    flow_id: Option<String>,
    labels: Labels,
    resources: ResourceScope,
}

impl RunContext {
    /// Creates a context that is not attached to any execution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the context to an execution.
    pub fn with_execution(
        mut self,
        execution_id: Uuid,
        namespace: impl Into<String>,
        flow_id: impl Into<String>,
    ) -> Self {
        self.execution_id = Some(execution_id);
        self.namespace = Some(namespace.into());
        self.flow_id = Some(flow_id.into());
        self
    }

    /// Sets the labels of the invoking execution.
    pub fn with_labels(mut self, labels: impl Into<Labels>) -> Self {
        self.labels = labels.into();
        self
    }

    /// Uses an existing resource scope.
    pub fn with_resources(mut self, resources: ResourceScope) -> Self {
        self.resources = resources;
        self
    }

    /// Returns the invoking execution id.
    pub fn execution_id(&self) -> Option<Uuid> {
        self.execution_id
    }

    /// Returns the invoking namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the invoking flow id.
    pub fn flow_id(&self) -> Option<&str> {
        self.flow_id.as_deref()
    }

    /// Returns the labels of the invoking execution.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Returns the turn's resource scope.
    pub fn resources(&self) -> &ResourceScope {
        &self.resources
    }
}
