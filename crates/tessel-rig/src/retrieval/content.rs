//! Content returned by retrieval sources.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessel_core::Parameters;

/// A piece of content returned by a retrieval source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContent {
    /// The retrieved text.
    pub content: String,

    /// Relevance score, higher is more relevant.
    pub score: f64,

    /// Source-specific metadata.
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub metadata: Parameters,
}

impl RetrievedContent {
    /// Creates content without metadata.
    pub fn new(content: impl Into<String>, score: f64) -> Self {
        Self {
            content: content.into(),
            score,
            metadata: Parameters::new(),
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replaces the metadata.
    pub fn with_metadata_map(mut self, metadata: Parameters) -> Self {
        self.metadata = metadata;
        self
    }
}
