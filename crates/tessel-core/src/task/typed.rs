//! Typed task authoring.

use std::marker::PhantomData;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{TaskOutput, TaskType};
use crate::action::{ParameterSchema, Parameters};
use crate::{Error, Result, RunContext};

/// A task whose parameters are a typed Rust struct.
///
/// The parameter schema and description are derived with `schemars`: the doc
/// comment on the struct becomes the task type's description.
///
/// # Example
///
/// ```ignore
/// /// Adds two numbers.
/// #[derive(Deserialize, JsonSchema)]
/// struct Add { a: i64, b: i64 }
///
/// #[async_trait::async_trait]
/// impl RunnableTask for Add {
///     const TYPE: &'static str = "math.add";
///
///     async fn run(self, _ctx: &RunContext) -> Result<TaskOutput> {
///         Ok(Some(json!({ "sum": self.a + self.b }).as_object().cloned().unwrap_or_default()))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait RunnableTask: DeserializeOwned + JsonSchema + Send + Sync + 'static {
    /// Registered type name.
    const TYPE: &'static str;

    /// Runs the task to completion.
    async fn run(self, ctx: &RunContext) -> Result<TaskOutput>;
}

/// Exposes a [`RunnableTask`] as a [`TaskType`].
pub struct TaskAdapter<T> {
    schema: ParameterSchema,
    _marker: PhantomData<fn() -> T>,
}

impl<T: RunnableTask> TaskAdapter<T> {
    /// Creates the adapter, deriving the parameter schema of `T`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: ParameterSchema::for_type::<T>()?,
            _marker: PhantomData,
        })
    }
}

#[async_trait::async_trait]
impl<T: RunnableTask> TaskType for TaskAdapter<T> {
    fn type_name(&self) -> &str {
        T::TYPE
    }

    fn description(&self) -> Option<&str> {
        self.schema.description()
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    async fn execute(&self, parameters: Parameters, ctx: &RunContext) -> Result<TaskOutput> {
        let task: T = serde_json::from_value(Value::Object(parameters)).map_err(|e| {
            Error::invalid_arguments(format!("cannot build '{}' task: {e}", T::TYPE))
                .with_source(e)
        })?;

        task.run(ctx).await
    }
}
