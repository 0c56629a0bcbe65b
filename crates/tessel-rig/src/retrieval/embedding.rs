//! Embedding-backed retrieval.

use std::sync::Arc;

use rig::embeddings::EmbeddingModel;
use tessel_core::{Error, Result};

use super::{RetrievalConfig, RetrievedContent, Retriever};
use crate::TRACING_TARGET_RETRIEVAL;

/// Turns text into vectors.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the dimension of produced vectors.
    fn dimensions(&self) -> usize;

    /// Embeds one text.
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;
}

/// [`Embedder`] backed by any rig-core embedding model.
#[derive(Debug, Clone)]
pub struct RigEmbedder<M> {
    model: M,
}

impl<M: EmbeddingModel> RigEmbedder<M> {
    /// Wraps a rig embedding model.
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Returns the wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }
}

#[async_trait::async_trait]
impl<M: EmbeddingModel> Embedder for RigEmbedder<M> {
    fn dimensions(&self) -> usize {
        self.model.ndims()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let embedding = self
            .model
            .embed_text(text)
            .await
            .map_err(|e| Error::retrieval("failed to embed query").with_source(e))?;
        Ok(embedding.vec)
    }
}

/// Nearest-neighbour search over stored vectors.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns the dimension of stored vectors.
    fn dimensions(&self) -> usize;

    /// Returns at most `limit` entries closest to `vector`, best first,
    /// skipping entries scoring below `min_score`.
    async fn search(
        &self,
        vector: &[f64],
        limit: usize,
        min_score: Option<f64>,
    ) -> Result<Vec<RetrievedContent>>;
}

/// Retriever that embeds the query and searches a vector store.
#[derive(Clone)]
pub struct EmbeddingRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    max_results: usize,
    min_score: Option<f64>,
}

impl EmbeddingRetriever {
    /// Pairs an embedder with a store.
    ///
    /// Fails with a configuration error if their dimensions differ.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: &RetrievalConfig,
    ) -> Result<Self> {
        if embedder.dimensions() != store.dimensions() {
            return Err(Error::configuration(format!(
                "embedding dimension {} does not match vector store dimension {}",
                embedder.dimensions(),
                store.dimensions()
            )));
        }

        Ok(Self {
            embedder,
            store,
            max_results: config.max_results,
            min_score: config.min_score,
        })
    }
}

#[async_trait::async_trait]
impl Retriever for EmbeddingRetriever {
    fn name(&self) -> &str {
        "embedding"
    }

    #[tracing::instrument(
        target = TRACING_TARGET_RETRIEVAL,
        skip_all,
        fields(max_results = self.max_results)
    )]
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedContent>> {
        let vector = self.embedder.embed(query).await?;
        let results = self
            .store
            .search(&vector, self.max_results, self.min_score)
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_RETRIEVAL,
            result_count = results.len(),
            "Vector search completed"
        );
        Ok(results)
    }
}

impl std::fmt::Debug for EmbeddingRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingRetriever")
            .field("dimensions", &self.store.dimensions())
            .field("max_results", &self.max_results)
            .field("min_score", &self.min_score)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::retrieval::{InMemoryVectorStore, StoredDocument};

    /// Embeds text as a fixed-size vector of letter counts of `a`, `b`, `c`.
    pub(crate) struct LetterEmbedder;

    #[async_trait::async_trait]
    impl Embedder for LetterEmbedder {
        fn dimensions(&self) -> usize {
            3
        }

        async fn embed(&self, text: &str) -> Result<Vec<f64>> {
            Ok(['a', 'b', 'c']
                .iter()
                .map(|letter| text.chars().filter(|c| c == letter).count() as f64)
                .collect())
        }
    }

    pub(crate) fn documents() -> Vec<StoredDocument> {
        vec![
            StoredDocument::new("alpha", vec![1.0, 0.0, 0.0]),
            StoredDocument::new("beta", vec![0.0, 1.0, 0.0]),
            StoredDocument::new("gamma", vec![0.0, 0.0, 1.0]),
        ]
    }

    #[tokio::test]
    async fn embeds_and_searches() {
        let store = InMemoryVectorStore::new(3, documents()).unwrap();
        let retriever = EmbeddingRetriever::new(
            Arc::new(LetterEmbedder),
            Arc::new(store),
            &RetrievalConfig::default().with_max_results(1),
        )
        .unwrap();

        let results = retriever.retrieve("bb").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "beta");
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let store = InMemoryVectorStore::new(2, Vec::new()).unwrap();
        let error = EmbeddingRetriever::new(
            Arc::new(LetterEmbedder),
            Arc::new(store),
            &RetrievalConfig::default(),
        )
        .unwrap_err();
        assert!(error.is_configuration());
    }
}
