//! Lookup of flow definitions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::FlowDefinition;
use crate::Result;

/// Source of flow definitions.
#[async_trait::async_trait]
pub trait FlowRepository: Send + Sync {
    /// Finds a flow by namespace and id.
    ///
    /// Returns the latest revision when `revision` is `None`.
    async fn find(
        &self,
        namespace: &str,
        flow_id: &str,
        revision: Option<u32>,
    ) -> Result<Option<FlowDefinition>>;
}

type FlowKey = (String, String);

/// Flow repository backed by memory, loaded from static configuration.
///
/// Cheap to clone; clones share the same definitions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlowRepository {
    flows: Arc<RwLock<HashMap<FlowKey, Vec<FlowDefinition>>>>,
}

impl InMemoryFlowRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a flow definition, replacing the same revision if present.
    pub fn insert(&self, flow: FlowDefinition) {
        let mut flows = self.flows.write().unwrap_or_else(|e| e.into_inner());
        let revisions = flows
            .entry((flow.namespace.clone(), flow.id.clone()))
            .or_default();

        revisions.retain(|f| f.revision != flow.revision);
        revisions.push(flow);
        revisions.sort_by_key(|f| f.revision);
    }

    /// Returns the number of distinct flows.
    pub fn len(&self) -> usize {
        self.flows.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns whether the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<FlowDefinition> for InMemoryFlowRepository {
    fn from_iter<I: IntoIterator<Item = FlowDefinition>>(iter: I) -> Self {
        let repository = Self::new();
        iter.into_iter().for_each(|flow| repository.insert(flow));
        repository
    }
}

#[async_trait::async_trait]
impl FlowRepository for InMemoryFlowRepository {
    async fn find(
        &self,
        namespace: &str,
        flow_id: &str,
        revision: Option<u32>,
    ) -> Result<Option<FlowDefinition>> {
        let flows = self.flows.read().unwrap_or_else(|e| e.into_inner());
        let Some(revisions) = flows.get(&(namespace.to_string(), flow_id.to_string())) else {
            return Ok(None);
        };

        let flow = match revision {
            Some(revision) => revisions.iter().find(|f| f.revision == revision),
            None => revisions.last(),
        };

        Ok(flow.cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_latest_and_exact_revision() {
        let repository: InMemoryFlowRepository = [
            FlowDefinition::new("team", "report").with_revision(2),
            FlowDefinition::new("team", "report").with_revision(1),
        ]
        .into_iter()
        .collect();

        assert_eq!(repository.len(), 1);

        let latest = repository.find("team", "report", None).await.unwrap().unwrap();
        assert_eq!(latest.revision, 2);

        let first = repository.find("team", "report", Some(1)).await.unwrap().unwrap();
        assert_eq!(first.revision, 1);

        assert!(repository.find("team", "report", Some(3)).await.unwrap().is_none());
        assert!(repository.find("team", "other", None).await.unwrap().is_none());
    }
}
