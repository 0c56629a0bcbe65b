//! Fan-out over several retrieval sources.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use tessel_core::Result;

use super::{MergePolicy, RetrievedContent, Retriever, RouterConfig};
use crate::TRACING_TARGET_RETRIEVAL;

/// Broadcasts each query to all sources concurrently and merges the results.
///
/// With the default configuration results are concatenated in source order
/// without re-ranking or deduplication. Any failing source fails the query.
#[derive(Clone)]
pub struct RouterRetriever {
    sources: Vec<Arc<dyn Retriever>>,
    config: RouterConfig,
}

impl RouterRetriever {
    /// Creates a router over the given sources.
    pub fn new(sources: Vec<Arc<dyn Retriever>>, config: RouterConfig) -> Self {
        Self { sources, config }
    }

    /// Returns the sources in query order.
    pub fn sources(&self) -> &[Arc<dyn Retriever>] {
        &self.sources
    }

    /// Returns the merge configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn merge(&self, batches: Vec<Vec<RetrievedContent>>) -> Vec<RetrievedContent> {
        let mut merged: Vec<RetrievedContent> = batches.into_iter().flatten().collect();

        match self.config.policy {
            MergePolicy::Concatenate => {}
            MergePolicy::ScoreDescending => {
                merged.sort_by(|a, b| b.score.total_cmp(&a.score));
            }
        }

        if self.config.deduplicate {
            let mut seen = HashSet::new();
            merged.retain(|item| seen.insert(item.content.clone()));
        }

        merged
    }
}

#[async_trait::async_trait]
impl Retriever for RouterRetriever {
    fn name(&self) -> &str {
        "router"
    }

    #[tracing::instrument(
        target = TRACING_TARGET_RETRIEVAL,
        skip_all,
        fields(source_count = self.sources.len(), policy = %self.config.policy)
    )]
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedContent>> {
        let batches = try_join_all(self.sources.iter().map(|source| async move {
            source.retrieve(query).await.inspect_err(|error| {
                tracing::warn!(
                    target: TRACING_TARGET_RETRIEVAL,
                    source = source.name(),
                    error = %error,
                    "Retrieval source failed"
                );
            })
        }))
        .await?;

        Ok(self.merge(batches))
    }
}

impl std::fmt::Debug for RouterRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterRetriever")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .finish()
    }
}
