//! Task types that can be bound as tools.
//!
//! - [`TaskType`] - object-safe capability implemented by every task type
//! - [`RunnableTask`] - typed authoring trait, adapted by [`TaskAdapter`]
//! - [`TaskRegistry`] - lookup of task types by name
//!
//! Builtin task types live in [`builtin`].

pub mod builtin;
mod registry;
mod typed;

use strum::{AsRefStr, Display};

pub use self::registry::TaskRegistry;
pub use self::typed::{RunnableTask, TaskAdapter};
use crate::action::{ParameterSchema, Parameters};
use crate::{Result, RunContext};

/// Output of a task run; `None` when the task produced nothing.
pub type TaskOutput = Option<Parameters>;

/// Kind of a task type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    /// Leaf task that runs to completion in-process.
    Runnable,
    /// Control-flow task that orchestrates child tasks.
    Flowable,
}

/// A registered task type.
#[async_trait::async_trait]
pub trait TaskType: Send + Sync {
    /// Returns the registered type name.
    fn type_name(&self) -> &str;

    /// Returns the human-readable description, if the type declares one.
    fn description(&self) -> Option<&str>;

    /// Returns the full parameter schema.
    fn schema(&self) -> &ParameterSchema;

    /// Returns the kind of the task type.
    fn kind(&self) -> TaskKind {
        TaskKind::Runnable
    }

    /// Reconstructs a task instance from fully merged parameters and runs it.
    async fn execute(&self, parameters: Parameters, ctx: &RunContext) -> Result<TaskOutput>;
}

impl std::fmt::Debug for dyn TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskType")
            .field("type_name", &self.type_name())
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
