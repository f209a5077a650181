//! Output type resolution for vectorized primitives
//!
//! The output element type of an elementwise primitive is read from its type table:
//! an entry whose input codes match the inputs exactly wins; otherwise the first
//! entry (in table order) that every input casts to safely is used.

use super::{can_cast_safely, type_codes, DType, TypeTable};
use tracing::{debug, error};

/// Resolve the output element types for inputs of the given element types
///
/// Returns `None` when neither an exact nor a safely castable entry exists. The
/// failure is logged; callers decide how to continue.
pub fn resolve_output_types(inputs: &[DType], table: &TypeTable) -> Option<Vec<DType>> {
    if let Some(signature) = table.iter().find(|sig| sig.inputs == inputs) {
        return Some(signature.outputs.clone());
    }

    for signature in table.iter() {
        if signature.inputs.len() != inputs.len() {
            continue;
        }

        let castable = inputs
            .iter()
            .zip(&signature.inputs)
            .all(|(from, to)| can_cast_safely(*from, *to));

        if castable {
            debug!(
                "Found casting rule {} for {}",
                signature.input_codes(),
                type_codes(inputs)
            );
            return Some(signature.outputs.clone());
        }
    }

    error!(
        "Cannot find suitable casting rule for {} in {}",
        type_codes(inputs),
        table
    );
    None
}
