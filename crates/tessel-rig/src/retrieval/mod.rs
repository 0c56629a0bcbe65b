//! Composition of retrieval sources into a single retriever.
//!
//! A [`RetrievalComposer`] collects the configured sources: at most one
//! embedding-backed source (an [`Embedder`] paired with a
//! [`VectorStoreProvider`]) followed by any number of external [`Retriever`]s.
//! [`RetrievalComposer::compose`] opens the resources those sources need,
//! registers them in the turn's [`ResourceScope`] and returns a
//! [`ComposedRetriever`]: the source itself when there is exactly one, or a
//! fan-out [`RouterRetriever`] otherwise.
//!
//! [`ComposedRetriever`] also implements [`rig::vector_store::VectorStoreIndex`],
//! filtering on result metadata with [`MetadataFilter`].
//!
//! [`ResourceScope`]: tessel_core::resource::ResourceScope

mod composer;
mod config;
mod content;
mod embedding;
mod memory;
mod provider;
mod rig_index;
mod router;

pub use composer::{ComposedRetriever, RetrievalComposer};
pub use config::{MergePolicy, RetrievalConfig, RouterConfig};
pub use content::RetrievedContent;
pub use embedding::{Embedder, EmbeddingRetriever, RigEmbedder, VectorStore};
pub use memory::{InMemoryVectorStore, InMemoryVectorStoreProvider, StoredDocument};
pub use provider::{RetrieverProvider, VectorStoreProvider};
pub use rig_index::MetadataFilter;
pub use router::RouterRetriever;
use tessel_core::Result;

/// A source returning ranked content for a query.
///
/// Implementations take `&self` and must tolerate concurrent queries.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Returns a short name used in logs.
    fn name(&self) -> &str;

    /// Returns content relevant to `query`, most relevant first.
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedContent>>;
}
