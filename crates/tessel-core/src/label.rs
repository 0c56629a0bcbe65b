//! Execution labels.
//!
//! Labels are key/value annotations attached to executions. Keys starting with
//! [`SYSTEM_PREFIX`] are reserved for the platform.

use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Key prefix reserved for platform labels.
pub const SYSTEM_PREFIX: &str = "system.";

/// A single execution label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    /// Label key.
    pub key: String,
    /// Label value.
    pub value: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns whether this label is reserved for the platform.
    pub fn is_system(&self) -> bool {
        self.key.starts_with(SYSTEM_PREFIX)
    }
}

/// Ordered list of labels with overlay semantics.
///
/// Deserializes from either a list of `{key, value}` objects or a flat map;
/// non-string map values are rendered as JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deref, IntoIterator)]
#[serde(transparent)]
pub struct Labels(#[into_iterator(owned, ref)] Vec<Label>);

impl Labels {
    /// Creates an empty label list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label without de-duplication.
    pub fn push(&mut self, label: Label) {
        self.0.push(label);
    }

    /// Returns the value of the first label with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|l| l.key == key)
            .map(|l| l.value.as_str())
    }

    /// Returns whether a label with the given key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|l| l.key == key)
    }

    /// Keeps only the labels matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&Label) -> bool) {
        self.0.retain(f);
    }

    /// Overlays labels on top of this list.
    ///
    /// A label whose key already exists replaces the existing value in place;
    /// new keys are appended. Duplicate keys in `labels` resolve to the last one.
    pub fn overlay(&mut self, labels: impl IntoIterator<Item = Label>) {
        for label in labels {
            match self.0.iter_mut().find(|l| l.key == label.key) {
                Some(existing) => existing.value = label.value,
                None => self.0.push(label),
            }
        }
    }

    /// Returns the labels reserved for the platform.
    pub fn system(&self) -> Labels {
        self.0.iter().filter(|l| l.is_system()).cloned().collect()
    }

    /// Returns the first label with a reserved key, if any.
    pub fn first_system(&self) -> Option<&Label> {
        self.0.iter().find(|l| l.is_system())
    }

    /// Consumes the list into a vector.
    pub fn into_vec(self) -> Vec<Label> {
        self.0
    }
}

impl From<Vec<Label>> for Labels {
    fn from(labels: Vec<Label>) -> Self {
        Self(labels)
    }
}

impl FromIterator<Label> for Labels {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| Label::new(k, v)).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelsRepr {
    List(Vec<Label>),
    Map(serde_json::Map<String, Value>),
}

impl<'de> Deserialize<'de> for Labels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let labels = match LabelsRepr::deserialize(deserializer)? {
            LabelsRepr::List(list) => Self(list),
            LabelsRepr::Map(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    Value::String(value) => Label::new(key, value),
                    other => Label::new(key, other.to_string()),
                })
                .collect(),
        };
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn overlay_replaces_in_place_and_appends() {
        let mut labels: Labels = [("env", "prod"), ("team", "x")].into_iter().collect();
        labels.overlay([Label::new("team", "y"), Label::new("owner", "ana")]);

        let keys: Vec<_> = labels.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["env", "team", "owner"]);
        assert_eq!(labels.get("team"), Some("y"));
    }

    #[test]
    fn overlay_deduplicates_incoming_keys() {
        let mut labels = Labels::new();
        labels.overlay([Label::new("a", "1"), Label::new("a", "2")]);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("a"), Some("2"));
    }

    #[test]
    fn deserializes_list_and_map() {
        let list: Labels =
            serde_json::from_value(json!([{ "key": "a", "value": "1" }])).unwrap();
        assert_eq!(list.get("a"), Some("1"));

        let map: Labels = serde_json::from_value(json!({ "a": "1", "b": 2 })).unwrap();
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get("b"), Some("2"));
    }

    #[test]
    fn serializes_as_list() {
        let labels: Labels = [("a", "1")].into_iter().collect();
        assert_eq!(
            serde_json::to_value(&labels).unwrap(),
            json!([{ "key": "a", "value": "1" }])
        );
    }

    #[test]
    fn system_labels() {
        let labels: Labels = [("system.correlationId", "42"), ("env", "prod")]
            .into_iter()
            .collect();
        assert_eq!(labels.system().len(), 1);
        assert_eq!(labels.first_system().unwrap().key, "system.correlationId");
    }
}
