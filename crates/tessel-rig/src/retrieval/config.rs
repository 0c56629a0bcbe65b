//! Retrieval configuration.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Default number of results of an embedding-backed source.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Configuration of the retrieval sources of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Maximum results returned by the embedding-backed source
    #[cfg_attr(
        feature = "config",
        arg(
            long = "retrieval-max-results",
            env = "RETRIEVAL_MAX_RESULTS",
            default_value_t = DEFAULT_MAX_RESULTS
        )
    )]
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Minimum similarity score of the embedding-backed source (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "retrieval-min-score", env = "RETRIEVAL_MIN_SCORE")
    )]
    #[serde(default)]
    pub min_score: Option<f64>,

    /// How results of several sources are merged
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub router: RouterConfig,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_score: None,
            router: RouterConfig::default(),
        }
    }
}

impl RetrievalConfig {
    /// Sets the maximum number of results.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Sets the minimum similarity score.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Sets the router configuration.
    pub fn with_router(mut self, router: RouterConfig) -> Self {
        self.router = router;
        self
    }
}

/// Merge behaviour of a fan-out router.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// Merge policy
    #[cfg_attr(
        feature = "config",
        arg(
            long = "router-policy",
            env = "RETRIEVAL_ROUTER_POLICY",
            value_enum,
            default_value_t = MergePolicy::Concatenate
        )
    )]
    #[serde(default)]
    pub policy: MergePolicy,

    /// Drop results whose content was already returned
    #[cfg_attr(
        feature = "config",
        arg(long = "router-deduplicate", env = "RETRIEVAL_ROUTER_DEDUPLICATE")
    )]
    #[serde(default)]
    pub deduplicate: bool,
}

impl RouterConfig {
    /// Sets the merge policy.
    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables deduplication by content.
    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }
}

/// How a router merges the results of its sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MergePolicy {
    /// Results of each source in source order, as returned.
    #[default]
    Concatenate,
    /// All results ordered by descending score; ties keep source order.
    ScoreDescending,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: RetrievalConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, RetrievalConfig::default());
        assert_eq!(config.max_results, 5);

        let config: RetrievalConfig = serde_json::from_value(json!({
            "maxResults": 3,
            "router": { "policy": "score_descending", "deduplicate": true }
        }))
        .unwrap();
        assert_eq!(config.max_results, 3);
        assert_eq!(config.router.policy, MergePolicy::ScoreDescending);
        assert!(config.router.deduplicate);
    }
}
