//! Label reconciliation for submitted flows.

use tessel_core::flow::FlowDefinition;
use tessel_core::{Error, Labels, Result};

/// Rejects tool-predefined labels using the reserved prefix.
pub(crate) fn check_predefined(labels: &Labels) -> Result<()> {
    match labels.first_system() {
        Some(label) => Err(Error::configuration(format!(
            "predefined label '{}' uses a reserved prefix",
            label.key
        ))
        .with_field(&label.key)),
        None => Ok(()),
    }
}

/// Computes the labels of the submitted execution.
///
/// With inheritance, the invoking execution's labels are kept except keys the
/// target flow declares itself; without it, only reserved labels are kept.
/// Tool-predefined then model-supplied labels are overlaid, a later origin
/// replacing the value of an existing key in place. Every key appears once.
pub(crate) fn effective(
    inherited: &Labels,
    target: &FlowDefinition,
    inherit: bool,
    predefined: &Labels,
    supplied: Labels,
) -> Result<Labels> {
    if let Some(label) = supplied.first_system() {
        return Err(Error::invalid_arguments(format!(
            "label '{}' uses a reserved prefix",
            label.key
        ))
        .with_field(&label.key));
    }

    let kept = inherited
        .iter()
        .filter(|l| l.is_system() || (inherit && !target.labels.contains_key(&l.key)))
        .cloned();

    let mut labels = Labels::new();
    labels.overlay(kept);
    labels.overlay(predefined.iter().cloned());
    labels.overlay(supplied);
    Ok(labels)
}
