//! Input reconciliation for submitted flows.

use std::collections::BTreeMap;

use serde_json::Value;
use tessel_core::flow::FlowDefinition;
use tessel_core::{Error, Parameters, Result};

use crate::placeholder;

/// Rejects predefined inputs the target flow does not declare.
pub(crate) fn check_predefined(target: &FlowDefinition, predefined: &Parameters) -> Result<()> {
    match predefined.keys().find(|id| target.input(id).is_none()) {
        Some(id) => Err(Error::configuration(format!(
            "flow '{}' does not declare input '{id}'",
            target.full_name()
        ))
        .with_field(id)),
        None => Ok(()),
    }
}

/// Computes and validates the inputs of the submitted execution.
///
/// Model-supplied inputs overlay predefined ones. Placeholder and `null`
/// values count as unset. Predefined inputs the target does not declare are
/// skipped, while undeclared model-supplied inputs are rejected. Every
/// mandatory input must be present and every present input must match its
/// declared type.
pub(crate) fn effective(
    target: &FlowDefinition,
    predefined: &Parameters,
    supplied: Parameters,
) -> Result<BTreeMap<String, Value>> {
    if let Some(id) = supplied.keys().find(|id| target.input(id).is_none()) {
        return Err(Error::invalid_arguments(format!(
            "flow '{}' does not declare input '{id}'",
            target.full_name()
        ))
        .with_field(id));
    }

    let mut inputs: BTreeMap<String, Value> = placeholder::resolved(predefined)
        .into_iter()
        .filter(|(id, _)| target.input(id).is_some())
        .collect();

    inputs.extend(supplied);
    inputs.retain(|_, value| !value.is_null() && !placeholder::is_placeholder(value));

    for input in &target.inputs {
        match inputs.get(&input.id) {
            None if input.is_mandatory() => return Err(Error::missing_input(&input.id)),
            Some(value) if !input.input_type.accepts(value) => {
                return Err(Error::invalid_arguments(format!(
                    "input '{}' must be of type {}",
                    input.id, input.input_type
                ))
                .with_field(&input.id));
            }
            _ => {}
        }
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tessel_core::ErrorKind;
    use tessel_core::flow::{FlowInput, InputType};

    use super::*;

    fn params(value: Value) -> Parameters {
        value.as_object().cloned().unwrap()
    }

    fn target() -> FlowDefinition {
        FlowDefinition::new("team", "report")
            .with_input(FlowInput::new("day", InputType::Datetime))
            .with_input(FlowInput::new("format", InputType::String).with_defaults("pdf"))
            .with_input(FlowInput::new("copies", InputType::Int).optional())
    }

    #[test]
    fn supplied_inputs_win() {
        let inputs = effective(
            &target(),
            &params(json!({ "day": "...", "format": "csv" })),
            params(json!({ "day": "2026-01-01T00:00:00Z", "format": "xlsx" })),
        )
        .unwrap();

        assert_eq!(inputs["day"], "2026-01-01T00:00:00Z");
        assert_eq!(inputs["format"], "xlsx");
        assert!(!inputs.contains_key("copies"));
    }

    #[test]
    fn placeholder_counts_as_missing() {
        let error = effective(&target(), &params(json!({ "day": "..." })), Parameters::new())
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MissingInput);
        assert_eq!(error.field.as_deref(), Some("day"));
    }

    #[test]
    fn type_mismatch_and_unknown_inputs() {
        let error = effective(
            &target(),
            &Parameters::new(),
            params(json!({ "day": "2026-01-01T00:00:00Z", "copies": "two" })),
        )
        .unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidArguments);
        assert_eq!(error.field.as_deref(), Some("copies"));

        let error = effective(
            &target(),
            &Parameters::new(),
            params(json!({ "day": "2026-01-01T00:00:00Z", "unknown": 1 })),
        )
        .unwrap_err();
        assert_eq!(error.field.as_deref(), Some("unknown"));

        assert!(check_predefined(&target(), &params(json!({ "unknown": 1 }))).is_err());
    }
}
