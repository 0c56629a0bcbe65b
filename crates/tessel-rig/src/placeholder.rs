//! Placeholder detection for preset parameter values.
//!
//! A workflow author leaves a parameter open for the model by presetting it to
//! [`PLACEHOLDER`]. A parameter is open when it has no preset at all or when its
//! preset is the placeholder.

use serde_json::Value;
use tessel_core::Parameters;

/// Sentinel marking a preset value the model must supply.
pub const PLACEHOLDER: &str = "...";

/// Returns whether a preset value is the placeholder.
pub fn is_placeholder(value: &Value) -> bool {
    value.as_str() == Some(PLACEHOLDER)
}

/// Returns whether the parameter `name` is left open by `presets`.
pub fn is_open(presets: &Parameters, name: &str) -> bool {
    presets.get(name).is_none_or(is_placeholder)
}

/// Returns whether the parameter `name` is fixed by `presets`.
pub fn is_fixed(presets: &Parameters, name: &str) -> bool {
    !is_open(presets, name)
}

/// Returns a copy of `presets` without placeholder values.
pub fn resolved(presets: &Parameters) -> Parameters {
    presets
        .iter()
        .filter(|(_, value)| !is_placeholder(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn presets() -> Parameters {
        json!({ "a": 5, "b": "...", "d": "...." })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn open_and_fixed() {
        let presets = presets();

        assert!(is_fixed(&presets, "a"));
        assert!(is_open(&presets, "b"));
        assert!(is_open(&presets, "c"));
        assert!(is_fixed(&presets, "d"));
    }

    #[test]
    fn resolved_drops_placeholders() {
        let resolved = resolved(&presets());
        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains_key("a"));
        assert!(!resolved.contains_key("b"));
    }
}
