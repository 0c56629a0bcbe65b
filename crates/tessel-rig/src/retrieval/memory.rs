//! In-memory vector store over a document snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tessel_core::resource::{ReleaseFn, Scoped};
use tessel_core::{Error, Parameters, Result};

use super::{RetrievedContent, VectorStore, VectorStoreProvider};
use crate::TRACING_TARGET_RETRIEVAL;

/// A document with its precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Document text.
    pub content: String,

    /// Embedding of the text.
    pub vector: Vec<f64>,

    /// Metadata returned with matches.
    #[serde(default)]
    pub metadata: Parameters,
}

impl StoredDocument {
    /// Creates a document without metadata.
    pub fn new(content: impl Into<String>, vector: Vec<f64>) -> Self {
        Self {
            content: content.into(),
            vector,
            metadata: Parameters::new(),
        }
    }

    /// Sets the metadata.
    pub fn with_metadata(mut self, metadata: Parameters) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Cosine-similarity search over an immutable snapshot.
#[derive(Debug, Clone)]
pub struct InMemoryVectorStore {
    dimensions: usize,
    documents: Arc<[StoredDocument]>,
}

impl InMemoryVectorStore {
    /// Creates a store, checking every vector has the given dimension.
    pub fn new(dimensions: usize, documents: Vec<StoredDocument>) -> Result<Self> {
        if let Some(document) = documents.iter().find(|d| d.vector.len() != dimensions) {
            return Err(Error::configuration(format!(
                "document vector has dimension {}, expected {dimensions}",
                document.vector.len()
            )));
        }

        Ok(Self {
            dimensions,
            documents: documents.into(),
        })
    }

    /// Returns the number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns whether the store holds no document.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait::async_trait]
impl VectorStore for InMemoryVectorStore {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn search(
        &self,
        vector: &[f64],
        limit: usize,
        min_score: Option<f64>,
    ) -> Result<Vec<RetrievedContent>> {
        if vector.len() != self.dimensions {
            return Err(Error::retrieval(format!(
                "query vector has dimension {}, expected {}",
                vector.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(f64, &StoredDocument)> = self
            .documents
            .iter()
            .map(|document| (cosine_similarity(vector, &document.vector), document))
            .filter(|(score, _)| min_score.is_none_or(|min| *score >= min))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, document)| {
                RetrievedContent::new(document.content.clone(), score)
                    .with_metadata_map(document.metadata.clone())
            })
            .collect())
    }
}

/// Opens [`InMemoryVectorStore`] snapshots of a fixed document set.
///
/// Each call to [`VectorStoreProvider::open`] hands out a new snapshot whose
/// release is only logged.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectorStoreProvider {
    documents: Vec<StoredDocument>,
}

impl InMemoryVectorStoreProvider {
    /// Creates a provider over the given documents.
    pub fn new(documents: Vec<StoredDocument>) -> Self {
        Self { documents }
    }
}

#[async_trait::async_trait]
impl VectorStoreProvider for InMemoryVectorStoreProvider {
    async fn open(&self, dimensions: usize) -> Result<Scoped<Arc<dyn VectorStore>>> {
        let store = InMemoryVectorStore::new(dimensions, self.documents.clone())?;
        let document_count = store.len();

        tracing::debug!(
            target: TRACING_TARGET_RETRIEVAL,
            document_count,
            dimensions,
            "In-memory vector store opened"
        );

        let release = ReleaseFn::new(move || {
            tracing::debug!(
                target: TRACING_TARGET_RETRIEVAL,
                document_count,
                "In-memory vector store released"
            );
            Ok(())
        });

        let store: Arc<dyn VectorStore> = Arc::new(store);
        Ok(Scoped::new("in_memory_vector_store", store, release))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tessel_core::resource::ResourceScope;

    use super::*;

    #[tokio::test]
    async fn ranks_by_cosine_similarity() {
        let store = InMemoryVectorStore::new(
            2,
            vec![
                StoredDocument::new("east", vec![1.0, 0.0]),
                StoredDocument::new("north-east", vec![1.0, 1.0]),
                StoredDocument::new("north", vec![0.0, 1.0]),
            ],
        )
        .unwrap();

        let results = store.search(&[1.0, 0.2], 2, None).await.unwrap();
        let contents: Vec<_> = results.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["east", "north-east"]);

        let results = store.search(&[1.0, 0.0], 10, Some(0.5)).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.score >= 0.5));
    }

    #[test]
    fn rejects_inconsistent_documents() {
        let error =
            InMemoryVectorStore::new(3, vec![StoredDocument::new("x", vec![1.0])]).unwrap_err();
        assert!(error.is_configuration());
    }

    #[tokio::test]
    async fn provider_hands_out_scoped_snapshots() {
        let metadata = json!({ "source": "faq" }).as_object().cloned().unwrap();
        let provider = InMemoryVectorStoreProvider::new(vec![
            StoredDocument::new("x", vec![1.0, 0.0]).with_metadata(metadata),
        ]);
        let scope = ResourceScope::new();

        let store = provider.open(2).await.unwrap().register(&scope);
        assert_eq!(scope.len(), 1);

        let results = store.search(&[1.0, 0.0], 1, None).await.unwrap();
        assert_eq!(results[0].metadata["source"], "faq");

        scope.release_all().await.unwrap();
        assert!(scope.is_empty());
        assert!(provider.open(3).await.is_err());
    }
}
