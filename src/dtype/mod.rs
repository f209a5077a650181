//! Element types of numeric values and the casting rules between them
//!
//! Vectorized primitives declare the element types they accept and produce as a
//! table of single-character type codes (`"ll->l"`, `"dd->d"`, ...). This module
//! models those codes, the "safe" casting relation between them, and the resolution
//! of a primitive's output type from the element types of its inputs.

pub mod casting;
pub mod resolver;
pub mod signature;

pub use casting::can_cast_safely;
pub use resolver::resolve_output_types;
pub use signature::{TypeSignature, TypeTable};

use crate::error::{Result, TracerError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad category of an element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DTypeKind {
    Bool,
    Signed,
    Unsigned,
    Float,
    Complex,
    Object,
}

/// Element type of a numeric scalar or array, identified by its type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    LongLong,
    ULongLong,
    Float16,
    Float32,
    Float64,
    LongDouble,
    Complex64,
    Complex128,
    CLongDouble,
    Object,
}

impl DType {
    /// Every known element type, in type-code order
    pub const ALL: [DType; 19] = [
        DType::Bool,
        DType::Int8,
        DType::UInt8,
        DType::Int16,
        DType::UInt16,
        DType::Int32,
        DType::UInt32,
        DType::Int64,
        DType::UInt64,
        DType::LongLong,
        DType::ULongLong,
        DType::Float16,
        DType::Float32,
        DType::Float64,
        DType::LongDouble,
        DType::Complex64,
        DType::Complex128,
        DType::CLongDouble,
        DType::Object,
    ];

    /// Single-character type code
    pub fn code(self) -> char {
        match self {
            DType::Bool => '?',
            DType::Int8 => 'b',
            DType::UInt8 => 'B',
            DType::Int16 => 'h',
            DType::UInt16 => 'H',
            DType::Int32 => 'i',
            DType::UInt32 => 'I',
            DType::Int64 => 'l',
            DType::UInt64 => 'L',
            DType::LongLong => 'q',
            DType::ULongLong => 'Q',
            DType::Float16 => 'e',
            DType::Float32 => 'f',
            DType::Float64 => 'd',
            DType::LongDouble => 'g',
            DType::Complex64 => 'F',
            DType::Complex128 => 'D',
            DType::CLongDouble => 'G',
            DType::Object => 'O',
        }
    }

    /// Parse a single-character type code
    pub fn from_code(code: char) -> Result<Self> {
        DType::ALL
            .iter()
            .copied()
            .find(|dtype| dtype.code() == code)
            .ok_or_else(|| TracerError::InvalidTypeSignature(format!("unknown type code '{}'", code)))
    }

    pub fn kind(self) -> DTypeKind {
        match self {
            DType::Bool => DTypeKind::Bool,
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64 | DType::LongLong => {
                DTypeKind::Signed
            }
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64 | DType::ULongLong => {
                DTypeKind::Unsigned
            }
            DType::Float16 | DType::Float32 | DType::Float64 | DType::LongDouble => DTypeKind::Float,
            DType::Complex64 | DType::Complex128 | DType::CLongDouble => DTypeKind::Complex,
            DType::Object => DTypeKind::Object,
        }
    }

    /// Width of one element in bytes
    ///
    /// `LongDouble` is the x86-64 extended type padded to 16 bytes.
    pub fn itemsize(self) -> usize {
        match self {
            DType::Bool | DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 | DType::Float16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64
            | DType::UInt64
            | DType::LongLong
            | DType::ULongLong
            | DType::Float64
            | DType::Complex64
            | DType::Object => 8,
            DType::LongDouble | DType::Complex128 => 16,
            DType::CLongDouble => 32,
        }
    }

    /// Conventional lowercase name, e.g. `float64`
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::UInt8 => "uint8",
            DType::Int16 => "int16",
            DType::UInt16 => "uint16",
            DType::Int32 => "int32",
            DType::UInt32 => "uint32",
            DType::Int64 => "int64",
            DType::UInt64 => "uint64",
            DType::LongLong => "longlong",
            DType::ULongLong => "ulonglong",
            DType::Float16 => "float16",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::LongDouble => "longdouble",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
            DType::CLongDouble => "clongdouble",
            DType::Object => "object",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concatenate the type codes of a list of element types, e.g. `"fl"`
pub fn type_codes(dtypes: &[DType]) -> String {
    dtypes.iter().map(|dtype| dtype.code()).collect()
}
