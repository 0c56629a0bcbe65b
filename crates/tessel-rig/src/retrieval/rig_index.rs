//! rig-core [`VectorStoreIndex`] implementation for composed retrievers.

use std::cmp::Ordering;

use rig::vector_store::request::{SearchFilter, VectorSearchRequest};
use rig::vector_store::{VectorStoreError, VectorStoreIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessel_core::Parameters;

use super::{ComposedRetriever, RetrievedContent, Retriever};

/// Filter on the metadata of retrieved content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetadataFilter {
    /// Metadata value equals the given value.
    Eq(String, Value),
    /// Metadata value is greater than the given number or string.
    Gt(String, Value),
    /// Metadata value is less than the given number or string.
    Lt(String, Value),
    /// Both filters match.
    And(Box<MetadataFilter>, Box<MetadataFilter>),
    /// Either filter matches.
    Or(Box<MetadataFilter>, Box<MetadataFilter>),
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

impl MetadataFilter {
    /// Returns whether the metadata satisfies the filter.
    pub fn matches(&self, metadata: &Parameters) -> bool {
        match self {
            Self::Eq(key, value) => metadata.get(key) == Some(value),
            Self::Gt(key, value) => metadata
                .get(key)
                .and_then(|v| compare(v, value))
                .is_some_and(Ordering::is_gt),
            Self::Lt(key, value) => metadata
                .get(key)
                .and_then(|v| compare(v, value))
                .is_some_and(Ordering::is_lt),
            Self::And(lhs, rhs) => lhs.matches(metadata) && rhs.matches(metadata),
            Self::Or(lhs, rhs) => lhs.matches(metadata) || rhs.matches(metadata),
        }
    }
}

impl SearchFilter for MetadataFilter {
    type Value = Value;

    fn eq(key: String, value: Self::Value) -> Self {
        Self::Eq(key, value)
    }

    fn gt(key: String, value: Self::Value) -> Self {
        Self::Gt(key, value)
    }

    fn lt(key: String, value: Self::Value) -> Self {
        Self::Lt(key, value)
    }

    fn and(self, rhs: Self) -> Self {
        Self::And(Box::new(self), Box::new(rhs))
    }

    fn or(self, rhs: Self) -> Self {
        Self::Or(Box::new(self), Box::new(rhs))
    }
}

/// Keeps at most `samples` results passing the threshold and the filter,
/// paired with their position in the unfiltered results.
fn select(
    results: Vec<RetrievedContent>,
    threshold: Option<f64>,
    filter: Option<&MetadataFilter>,
    samples: usize,
) -> Vec<(usize, RetrievedContent)> {
    results
        .into_iter()
        .enumerate()
        .filter(|(_, item)| threshold.is_none_or(|min| item.score >= min))
        .filter(|(_, item)| filter.is_none_or(|filter| filter.matches(&item.metadata)))
        .take(samples)
        .collect()
}

impl ComposedRetriever {
    async fn search(
        &self,
        req: &VectorSearchRequest<MetadataFilter>,
    ) -> Result<Vec<(usize, RetrievedContent)>, VectorStoreError> {
        let results = self
            .retrieve(req.query())
            .await
            .map_err(|e| VectorStoreError::DatastoreError(Box::new(e)))?;

        let filter = req.filter().as_ref();
        Ok(select(results, req.threshold(), filter, req.samples() as usize))
    }
}

/// Returns the `id` metadata entry, or the result position.
fn document_id(position: usize, item: &RetrievedContent) -> String {
    match item.metadata.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => position.to_string(),
    }
}

impl VectorStoreIndex for ComposedRetriever {
    type Filter = MetadataFilter;

    async fn top_n<T: for<'a> Deserialize<'a> + Send>(
        &self,
        req: VectorSearchRequest<Self::Filter>,
    ) -> Result<Vec<(f64, String, T)>, VectorStoreError> {
        self.search(&req)
            .await?
            .into_iter()
            .map(|(position, item)| -> Result<_, VectorStoreError> {
                let id = document_id(position, &item);
                let document: T = serde_json::from_value(serde_json::to_value(&item)?)?;
                Ok((item.score, id, document))
            })
            .collect()
    }

    async fn top_n_ids(
        &self,
        req: VectorSearchRequest<Self::Filter>,
    ) -> Result<Vec<(f64, String)>, VectorStoreError> {
        Ok(self
            .search(&req)
            .await?
            .into_iter()
            .map(|(position, item)| (item.score, document_id(position, &item)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn metadata(value: Value) -> Parameters {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn filter_matches_metadata() {
        let meta = metadata(json!({ "lang": "en", "year": 2021 }));

        assert!(MetadataFilter::eq("lang".into(), json!("en")).matches(&meta));
        assert!(MetadataFilter::gt("year".into(), json!(2020)).matches(&meta));
        assert!(!MetadataFilter::lt("year".into(), json!(2020)).matches(&meta));
        assert!(!MetadataFilter::gt("missing".into(), json!(1)).matches(&meta));
        assert!(
            MetadataFilter::eq("lang".into(), json!("fr"))
                .or(MetadataFilter::eq("lang".into(), json!("en")))
                .matches(&meta)
        );
        assert!(
            !MetadataFilter::eq("lang".into(), json!("en"))
                .and(MetadataFilter::gt("year".into(), json!(2030)))
                .matches(&meta)
        );
    }

    #[test]
    fn document_id_prefers_metadata() {
        let item = RetrievedContent::new("x", 1.0).with_metadata("id", "doc-7");
        assert_eq!(document_id(3, &item), "doc-7");
        assert_eq!(document_id(3, &RetrievedContent::new("x", 1.0)), "3");
    }

    #[test]
    fn select_applies_threshold_filter_and_samples() {
        let results = vec![
            RetrievedContent::new("a", 0.9).with_metadata("lang", "en"),
            RetrievedContent::new("b", 0.8).with_metadata("lang", "fr"),
            RetrievedContent::new("c", 0.7).with_metadata("lang", "en"),
            RetrievedContent::new("d", 0.6).with_metadata("lang", "en"),
        ];
        let filter = MetadataFilter::eq("lang".into(), json!("en"));

        let selected = select(results.clone(), None, Some(&filter), 2);
        let picked: Vec<_> = selected.iter().map(|(i, r)| (*i, r.content.as_str())).collect();
        assert_eq!(picked, [(0, "a"), (2, "c")]);

        let selected = select(results, Some(0.75), None, 10);
        assert_eq!(selected.len(), 2);
    }
}
