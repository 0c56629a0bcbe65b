//! Static toolkit file.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tessel_core::ActionDefinition;
use tessel_core::flow::{FlowDefinition, InMemoryFlowRepository};
use tessel_rig::retrieval::StoredDocument;

use crate::TRACING_TARGET_CONFIG;

/// Actions to expose, the flows they may target and the documents to search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toolkit {
    /// Actions bound as tools.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,

    /// Flow definitions flow actions resolve against.
    #[serde(default)]
    pub flows: Vec<FlowDefinition>,

    /// Documents with precomputed embeddings.
    #[serde(default)]
    pub documents: Vec<StoredDocument>,
}

impl Toolkit {
    /// Reads a toolkit from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).context("cannot read file")?;
        let toolkit: Self = serde_json::from_str(&content).context("invalid toolkit JSON")?;

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            actions = toolkit.actions.len(),
            flows = toolkit.flows.len(),
            documents = toolkit.documents.len(),
            "Toolkit loaded"
        );
        Ok(toolkit)
    }

    /// Returns a repository over the configured flows.
    pub fn flow_repository(&self) -> InMemoryFlowRepository {
        self.flows.iter().cloned().collect()
    }
}
