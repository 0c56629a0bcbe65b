use clap::Args;

/// OpenAI embedding options used to embed retrieval queries.
#[derive(Debug, Clone, Args)]
pub struct EmbeddingArgs {
    /// OpenAI API key
    #[arg(long = "openai-api-key", env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Embedding model name
    #[arg(
        long = "embedding-model",
        env = "EMBEDDING_MODEL",
        default_value = "text-embedding-3-small"
    )]
    pub embedding_model: String,

    /// Embedding vector dimension; must match the document vectors
    #[arg(
        long = "embedding-dimensions",
        env = "EMBEDDING_DIMENSIONS",
        default_value_t = 1536
    )]
    pub embedding_dimensions: usize,
}
