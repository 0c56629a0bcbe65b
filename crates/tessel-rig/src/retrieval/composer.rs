//! Assembly of the retrieval sources of a turn.

use std::sync::Arc;

use tessel_core::resource::ResourceScope;
use tessel_core::{Error, Result};

use super::{
    Embedder, EmbeddingRetriever, RetrievalConfig, RetrievedContent, Retriever,
    RetrieverProvider, RouterRetriever, VectorStoreProvider,
};
use crate::TRACING_TARGET_RETRIEVAL;

#[derive(Clone)]
enum Source {
    Ready(Arc<dyn Retriever>),
    Provided(Arc<dyn RetrieverProvider>),
}

/// Collects retrieval sources and composes them into one retriever.
///
/// The embedding-backed source, when configured, always comes first; other
/// sources follow in the order they were added.
#[derive(Clone, Default)]
pub struct RetrievalComposer {
    config: RetrievalConfig,
    embedding: Option<(Arc<dyn Embedder>, Arc<dyn VectorStoreProvider>)>,
    sources: Vec<Source>,
}

impl RetrievalComposer {
    /// Creates a composer without sources.
    pub fn new(config: RetrievalConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Sets the embedding-backed source.
    pub fn with_embedding(
        mut self,
        embedder: impl Embedder + 'static,
        stores: impl VectorStoreProvider + 'static,
    ) -> Self {
        self.embedding = Some((Arc::new(embedder), Arc::new(stores)));
        self
    }

    /// Adds a retriever that holds no turn-scoped resource.
    pub fn with_retriever(mut self, retriever: impl Retriever + 'static) -> Self {
        self.sources.push(Source::Ready(Arc::new(retriever)));
        self
    }

    /// Adds a retriever built when the turn starts.
    pub fn with_retriever_provider(mut self, provider: impl RetrieverProvider + 'static) -> Self {
        self.sources.push(Source::Provided(Arc::new(provider)));
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Returns the number of configured sources.
    pub fn source_count(&self) -> usize {
        usize::from(self.embedding.is_some()) + self.sources.len()
    }

    /// Opens all sources and composes them.
    ///
    /// Resources opened by the sources are registered in `resources`. Fails
    /// with a retrieval configuration error, before anything is opened, if no
    /// source is configured.
    #[tracing::instrument(
        target = TRACING_TARGET_RETRIEVAL,
        skip_all,
        fields(source_count = self.source_count())
    )]
    pub async fn compose(&self, resources: &ResourceScope) -> Result<ComposedRetriever> {
        if self.source_count() == 0 {
            return Err(Error::retrieval_configuration(
                "at least one retrieval source must be configured",
            ));
        }

        let mut retrievers: Vec<Arc<dyn Retriever>> = Vec::with_capacity(self.source_count());

        if let Some((embedder, stores)) = &self.embedding {
            let store = stores.open(embedder.dimensions()).await?.register(resources);
            let retriever = EmbeddingRetriever::new(embedder.clone(), store, &self.config)?;
            retrievers.push(Arc::new(retriever));
        }

        for source in &self.sources {
            let retriever = match source {
                Source::Ready(retriever) => retriever.clone(),
                Source::Provided(provider) => provider.build().await?.register(resources),
            };
            retrievers.push(retriever);
        }

        let composed = if retrievers.len() == 1 {
            ComposedRetriever::Single(retrievers.remove(0))
        } else {
            ComposedRetriever::Router(RouterRetriever::new(
                retrievers,
                self.config.router.clone(),
            ))
        };

        tracing::debug!(
            target: TRACING_TARGET_RETRIEVAL,
            retriever = ?composed,
            "Retrieval sources composed"
        );
        Ok(composed)
    }
}

impl std::fmt::Debug for RetrievalComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalComposer")
            .field("config", &self.config)
            .field("embedding", &self.embedding.is_some())
            .field("sources", &self.sources.len())
            .finish()
    }
}

/// The retriever a turn queries.
#[derive(Clone)]
pub enum ComposedRetriever {
    /// The only configured source, used as is.
    Single(Arc<dyn Retriever>),
    /// Fan-out over two or more sources.
    Router(RouterRetriever),
}

impl ComposedRetriever {
    /// Returns whether queries fan out to several sources.
    pub fn is_router(&self) -> bool {
        matches!(self, Self::Router(_))
    }

    /// Returns the number of underlying sources.
    pub fn source_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Router(router) => router.sources().len(),
        }
    }
}

#[async_trait::async_trait]
impl Retriever for ComposedRetriever {
    fn name(&self) -> &str {
        match self {
            Self::Single(retriever) => retriever.name(),
            Self::Router(router) => router.name(),
        }
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedContent>> {
        match self {
            Self::Single(retriever) => retriever.retrieve(query).await,
            Self::Router(router) => router.retrieve(query).await,
        }
    }
}

impl std::fmt::Debug for ComposedRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(retriever) => f.debug_tuple("Single").field(&retriever.name()).finish(),
            Self::Router(router) => f.debug_tuple("Router").field(router).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tessel_core::ErrorKind;
    use tessel_core::resource::{ReleaseFn, Scoped};

    use super::*;
    use crate::retrieval::InMemoryVectorStoreProvider;
    use crate::retrieval::embedding::tests::{LetterEmbedder, documents};
    use crate::retrieval::router::tests::Fixed;

    struct ScopedFixed;

    #[async_trait::async_trait]
    impl RetrieverProvider for ScopedFixed {
        async fn build(&self) -> Result<Scoped<Arc<dyn Retriever>>> {
            let retriever: Arc<dyn Retriever> = Arc::new(Fixed::new("web", &[("web hit", 0.4)]));
            Ok(Scoped::new("web_client", retriever, ReleaseFn::new(|| Ok(()))))
        }
    }

    #[tokio::test]
    async fn rejects_zero_sources() {
        let resources = ResourceScope::new();
        let error = RetrievalComposer::default()
            .compose(&resources)
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::RetrievalConfiguration);
        assert!(error.is_configuration());
        assert!(resources.is_empty());
    }

    #[tokio::test]
    async fn single_source_passes_through() {
        let resources = ResourceScope::new();
        let source = Fixed::new("docs", &[("b", 0.1), ("a", 0.9)]);
        let expected = source.retrieve("q").await.unwrap();

        let composed = RetrievalComposer::default()
            .with_retriever(source)
            .compose(&resources)
            .await
            .unwrap();

        assert!(!composed.is_router());
        assert_eq!(composed.name(), "docs");
        assert_eq!(composed.retrieve("q").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn embedding_source_comes_first() {
        let resources = ResourceScope::new();
        let composed = RetrievalComposer::new(RetrievalConfig::default().with_max_results(1))
            .with_retriever_provider(ScopedFixed)
            .with_embedding(LetterEmbedder, InMemoryVectorStoreProvider::new(documents()))
            .compose(&resources)
            .await
            .unwrap();

        assert!(composed.is_router());
        assert_eq!(composed.source_count(), 2);
        assert_eq!(resources.len(), 2);

        let results = composed.retrieve("cc").await.unwrap();
        let contents: Vec<_> = results.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["gamma", "web hit"]);

        resources.release_all().await.unwrap();
        assert!(resources.is_empty());
    }
}
