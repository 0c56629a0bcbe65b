//! Projection of parameter schemas against preset values.

use tessel_core::{ParameterSchema, Parameters};

use crate::placeholder;

/// Projects `schema` to the parameters left open by `presets`.
///
/// A property is dropped from `properties` and `required` iff it has a preset
/// that is not the placeholder. Remaining entries are kept verbatim. Only
/// top-level keys take part: nested sub-schemas are never diffed.
pub fn project(schema: &ParameterSchema, presets: &Parameters) -> ParameterSchema {
    let projected = schema
        .properties()
        .iter()
        .filter(|(name, _)| placeholder::is_open(presets, name))
        .fold(ParameterSchema::new(), |acc, (name, property)| {
            acc.with_property(name.as_str(), property.clone())
        });

    let projected = schema
        .required()
        .iter()
        .filter(|name| placeholder::is_open(presets, name))
        .fold(projected, |acc, name| acc.with_required(name.as_str()));

    match schema.description() {
        Some(description) => projected.with_description(description),
        None => projected,
    }
}
