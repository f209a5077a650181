//! Type-signature tables declared by vectorized primitives

use super::{type_codes, DType};
use crate::error::{Result, TracerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ARROW: &str = "->";

/// One `<input-codes>-><output-codes>` entry of a type table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSignature {
    pub inputs: Vec<DType>,
    pub outputs: Vec<DType>,
}

impl TypeSignature {
    pub fn new(inputs: Vec<DType>, outputs: Vec<DType>) -> Self {
        Self { inputs, outputs }
    }

    /// Concatenated input codes, e.g. `"ll"`
    pub fn input_codes(&self) -> String {
        type_codes(&self.inputs)
    }

    pub fn output_codes(&self) -> String {
        type_codes(&self.outputs)
    }
}

impl FromStr for TypeSignature {
    type Err = TracerError;

    fn from_str(s: &str) -> Result<Self> {
        let (inputs, outputs) = s
            .split_once(ARROW)
            .ok_or_else(|| TracerError::InvalidTypeSignature(format!("missing '->' in '{}'", s)))?;

        if outputs.is_empty() {
            return Err(TracerError::InvalidTypeSignature(format!("no output type in '{}'", s)));
        }

        let inputs = inputs.chars().map(DType::from_code).collect::<Result<Vec<_>>>()?;
        let outputs = outputs.chars().map(DType::from_code).collect::<Result<Vec<_>>>()?;

        Ok(Self { inputs, outputs })
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.input_codes(), ARROW, self.output_codes())
    }
}

/// Ordered, read-only list of the type signatures a primitive supports
///
/// Table order is significant: it breaks ties during casting resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTable {
    signatures: Vec<TypeSignature>,
}

impl TypeTable {
    pub fn new(signatures: Vec<TypeSignature>) -> Self {
        Self { signatures }
    }

    /// Parse a table from its string entries, e.g. `["ll->l", "dd->d"]`
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let signatures = entries
            .iter()
            .map(|entry| entry.as_ref().parse())
            .collect::<Result<Vec<TypeSignature>>>()?;
        Ok(Self { signatures })
    }

    pub fn signatures(&self) -> &[TypeSignature] {
        &self.signatures
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeSignature> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl fmt::Display for TypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.signatures.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", entries.join(", "))
    }
}
