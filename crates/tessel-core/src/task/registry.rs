//! Registry of available task types.

use std::collections::HashMap;
use std::sync::Arc;

use super::builtin::{Log, Return, Sequential};
use super::{RunnableTask, TaskAdapter, TaskType};
use crate::{Error, Result};

/// Registry of task types, keyed by type name.
#[derive(Default, Clone)]
pub struct TaskRegistry {
    types: HashMap<String, Arc<dyn TaskType>>,
}

impl TaskRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the builtin task types.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        registry.register::<Log>()?;
        registry.register::<Return>()?;
        registry.register_type(Arc::new(Sequential::new()));
        Ok(registry)
    }

    /// Registers a typed task.
    pub fn register<T: RunnableTask>(&mut self) -> Result<()> {
        let adapter = TaskAdapter::<T>::new().map_err(|e| {
            Error::configuration(format!("cannot derive schema of '{}'", T::TYPE))
                .with_source(e)
        })?;
        self.register_type(Arc::new(adapter));
        Ok(())
    }

    /// Registers a task type, replacing any type with the same name.
    pub fn register_type(&mut self, task_type: Arc<dyn TaskType>) {
        self.types
            .insert(task_type.type_name().to_string(), task_type);
    }

    /// Returns a task type by name.
    pub fn get(&self, type_name: &str) -> Option<Arc<dyn TaskType>> {
        self.types.get(type_name).cloned()
    }

    /// Returns whether a task type exists.
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}
