//! Normalization of return values into name-to-value mappings

use crate::value::{Value, ValueMap};

/// Label a callable's return value
///
/// Mappings are kept as they are, tuples become `Ret0`, `Ret1`, ... and any other
/// value is recorded under `Ret`.
pub fn normalize_output(output: &Value) -> ValueMap {
    match output {
        Value::Map(map) => map.clone(),
        Value::Tuple(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (format!("Ret{}", i), item.clone()))
            .collect(),
        other => ValueMap::from([("Ret".to_string(), other.clone())]),
    }
}
