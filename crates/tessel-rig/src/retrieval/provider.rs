//! Capabilities that open the resources behind retrieval sources.

use std::sync::Arc;

use tessel_core::Result;
use tessel_core::resource::Scoped;

use super::{Retriever, VectorStore};

/// Opens vector stores for embedding-backed retrieval.
///
/// The returned handle is released by the caller's resource scope; providers
/// must not cache it.
#[async_trait::async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Opens a store holding vectors of the given dimension.
    async fn open(&self, dimensions: usize) -> Result<Scoped<Arc<dyn VectorStore>>>;
}

/// Builds external retrievers such as web search or structured-data lookups.
#[async_trait::async_trait]
pub trait RetrieverProvider: Send + Sync {
    /// Builds a retriever whose resources are released by the caller.
    async fn build(&self) -> Result<Scoped<Arc<dyn Retriever>>>;
}
