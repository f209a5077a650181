//! Dynamic values passed to and returned from instrumented callables
//!
//! Arguments and return values are captured as [`Value`]s so that a single trace
//! record can describe calls of any shape. Numeric arrays carry their element type,
//! which the vectorized-primitive wrapper uses to re-type results.

use crate::dtype::{DType, DTypeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name-to-value mapping used for bound arguments and normalized outputs
pub type ValueMap = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// A captured argument or return value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
    Str(String),
    List(Vec<Value>),
    /// Fixed group of independent values; the multiple-return convention
    Tuple(Vec<Value>),
    Map(ValueMap),
    Array(NdArray),
}

impl Value {
    /// Element type of this value as seen by a vectorized primitive
    pub fn dtype(&self) -> DType {
        match self {
            Value::Bool(_) => DType::Bool,
            Value::Int(_) => DType::Int64,
            Value::Float(_) => DType::Float64,
            Value::Complex(_) => DType::Complex128,
            Value::Array(array) => array.dtype,
            Value::List(items) => infer_list_dtype(items),
            Value::None | Value::Str(_) | Value::Tuple(_) | Value::Map(_) => DType::Object,
        }
    }

    /// Re-cast a numeric value to the given element type(s)
    ///
    /// Scalars and arrays use the first type; a tuple is re-cast element-wise and
    /// needs one type per element. Returns `None` for values that cannot be re-cast.
    pub fn astype(&self, dtypes: &[DType]) -> Option<Value> {
        match self {
            Value::Tuple(items) => {
                if items.len() != dtypes.len() {
                    return None;
                }
                items
                    .iter()
                    .zip(dtypes)
                    .map(|(item, dtype)| item.astype(std::slice::from_ref(dtype)))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Tuple)
            }
            _ => {
                let dtype = *dtypes.first()?;
                let array = match self {
                    Value::Array(array) => array.clone(),
                    other => NdArray::from_scalar(other)?,
                };
                Some(Value::Array(array.astype(dtype)))
            }
        }
    }

}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<NdArray> for Value {
    fn from(value: NdArray) -> Self {
        Value::Array(value)
    }
}

fn infer_list_dtype(items: &[Value]) -> DType {
    if items.is_empty() {
        return DType::Float64;
    }

    let mut inferred = DType::Bool;
    for item in items {
        let dtype = match item {
            Value::Bool(_) => DType::Bool,
            Value::Int(_) => DType::Int64,
            Value::Float(_) => DType::Float64,
            Value::Complex(_) => DType::Complex128,
            _ => return DType::Object,
        };
        if rank(dtype) > rank(inferred) {
            inferred = dtype;
        }
    }
    inferred
}

fn rank(dtype: DType) -> u8 {
    match dtype.kind() {
        DTypeKind::Bool => 0,
        DTypeKind::Signed | DTypeKind::Unsigned => 1,
        DTypeKind::Float => 2,
        DTypeKind::Complex => 3,
        DTypeKind::Object => 4,
    }
}

/// Element storage of an [`NdArray`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "storage", content = "data", rename_all = "snake_case")]
pub enum ArrayData {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    UInt(Vec<u64>),
    Float(Vec<f64>),
    Complex(Vec<Complex>),
    Object(Vec<Value>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Bool(data) => data.len(),
            ArrayData::Int(data) => data.len(),
            ArrayData::UInt(data) => data.len(),
            ArrayData::Float(data) => data.len(),
            ArrayData::Complex(data) => data.len(),
            ArrayData::Object(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_complex(&self) -> Vec<Complex> {
        match self {
            ArrayData::Complex(data) => data.clone(),
            other => other.to_f64().into_iter().map(|re| Complex::new(re, 0.0)).collect(),
        }
    }

    fn to_f64(&self) -> Vec<f64> {
        match self {
            ArrayData::Bool(data) => data.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect(),
            ArrayData::Int(data) => data.iter().map(|&i| i as f64).collect(),
            ArrayData::UInt(data) => data.iter().map(|&u| u as f64).collect(),
            ArrayData::Float(data) => data.clone(),
            ArrayData::Complex(data) => data.iter().map(|c| c.re).collect(),
            ArrayData::Object(data) => data.iter().map(object_as_f64).collect(),
        }
    }

    fn to_i128(&self) -> Vec<i128> {
        match self {
            ArrayData::Bool(data) => data.iter().map(|&b| b as i128).collect(),
            ArrayData::Int(data) => data.iter().map(|&i| i as i128).collect(),
            ArrayData::UInt(data) => data.iter().map(|&u| u as i128).collect(),
            other => other.to_f64().into_iter().map(|f| f as i128).collect(),
        }
    }

    fn to_bool(&self) -> Vec<bool> {
        match self {
            ArrayData::Bool(data) => data.clone(),
            ArrayData::Int(data) => data.iter().map(|&i| i != 0).collect(),
            ArrayData::UInt(data) => data.iter().map(|&u| u != 0).collect(),
            ArrayData::Complex(data) => data.iter().map(|c| c.re != 0.0 || c.im != 0.0).collect(),
            other => other.to_f64().into_iter().map(|f| f != 0.0).collect(),
        }
    }

    fn to_objects(&self) -> Vec<Value> {
        match self {
            ArrayData::Bool(data) => data.iter().map(|&b| Value::Bool(b)).collect(),
            ArrayData::Int(data) => data.iter().map(|&i| Value::Int(i)).collect(),
            ArrayData::UInt(data) => data.iter().map(|&u| uint_object(u)).collect(),
            ArrayData::Float(data) => data.iter().map(|&f| Value::Float(f)).collect(),
            ArrayData::Complex(data) => data.iter().map(|&c| Value::Complex(c)).collect(),
            ArrayData::Object(data) => data.clone(),
        }
    }
}

/// `u` as an object element; values beyond `i64` stay a typed `uint64` scalar
fn uint_object(u: u64) -> Value {
    match i64::try_from(u) {
        Ok(i) => Value::Int(i),
        Err(_) => Value::Array(NdArray {
            dtype: DType::UInt64,
            shape: Vec::new(),
            data: ArrayData::UInt(vec![u]),
        }),
    }
}

fn object_as_f64(value: &Value) -> f64 {
    match value {
        Value::Array(array) => array.data.to_f64().first().copied().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Complex(c) => c.re,
        _ => f64::NAN,
    }
}

/// Typed n-dimensional array; a 0-d array is a typed scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdArray {
    pub dtype: DType,
    pub shape: Vec<usize>,
    pub data: ArrayData,
}

impl NdArray {
    /// One-dimensional array of `dtype` built from `data`, re-cast to `dtype`
    pub fn from_vec(dtype: DType, data: ArrayData) -> Self {
        let shape = vec![data.len()];
        NdArray { dtype, shape, data }.astype(dtype)
    }

    /// 0-d array holding one element
    pub fn scalar(dtype: DType, data: ArrayData) -> Self {
        NdArray { dtype, shape: Vec::new(), data }.astype(dtype)
    }

    fn from_scalar(value: &Value) -> Option<Self> {
        let (dtype, data) = match value {
            Value::Bool(b) => (DType::Bool, ArrayData::Bool(vec![*b])),
            Value::Int(i) => (DType::Int64, ArrayData::Int(vec![*i])),
            Value::Float(f) => (DType::Float64, ArrayData::Float(vec![*f])),
            Value::Complex(c) => (DType::Complex128, ArrayData::Complex(vec![*c])),
            _ => return None,
        };
        Some(NdArray { dtype, shape: Vec::new(), data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy of this array converted to `dtype`
    ///
    /// Integers wrap around to the target width, floats truncate toward zero when
    /// converted to integers, and float values are rounded to the target precision.
    pub fn astype(&self, dtype: DType) -> NdArray {
        let data = match dtype.kind() {
            DTypeKind::Bool => ArrayData::Bool(self.data.to_bool()),
            DTypeKind::Signed => ArrayData::Int(
                self.data.to_i128().into_iter().map(|v| wrap_signed(v, dtype.itemsize())).collect(),
            ),
            DTypeKind::Unsigned => ArrayData::UInt(
                self.data
                    .to_i128()
                    .into_iter()
                    .map(|v| wrap_unsigned(v, dtype.itemsize()))
                    .collect(),
            ),
            DTypeKind::Float => ArrayData::Float(
                self.data.to_f64().into_iter().map(|v| round_float(v, dtype)).collect(),
            ),
            DTypeKind::Complex => ArrayData::Complex(
                self.data
                    .to_complex()
                    .into_iter()
                    .map(|c| {
                        let component = component_type(dtype);
                        Complex::new(round_float(c.re, component), round_float(c.im, component))
                    })
                    .collect(),
            ),
            DTypeKind::Object => ArrayData::Object(self.data.to_objects()),
        };

        NdArray {
            dtype,
            shape: self.shape.clone(),
            data,
        }
    }
}

fn wrap_signed(value: i128, size: usize) -> i64 {
    match size {
        1 => value as i8 as i64,
        2 => value as i16 as i64,
        4 => value as i32 as i64,
        _ => value as i64,
    }
}

fn wrap_unsigned(value: i128, size: usize) -> u64 {
    match size {
        1 => value as u8 as u64,
        2 => value as u16 as u64,
        4 => value as u32 as u64,
        _ => value as u64,
    }
}

fn component_type(complex: DType) -> DType {
    match complex {
        DType::Complex64 => DType::Float32,
        DType::Complex128 => DType::Float64,
        _ => DType::LongDouble,
    }
}

fn round_float(value: f64, dtype: DType) -> f64 {
    match dtype {
        DType::Float16 => round_to_half(value),
        DType::Float32 => value as f32 as f64,
        _ => value,
    }
}

/// Round to the nearest IEEE half-precision value, ties to even
fn round_to_half(value: f64) -> f64 {
    const MAX_HALF: f64 = 65504.0;
    const MIN_NORMAL_EXP: i32 = -14;
    const MANTISSA_BITS: i32 = 10;

    if !value.is_finite() || value == 0.0 {
        return value;
    }

    let exponent = (value.abs().log2().floor() as i32).max(MIN_NORMAL_EXP);
    let quantum = 2f64.powi(exponent - MANTISSA_BITS);
    let rounded = (value / quantum).round_ties_even() * quantum;

    if rounded.abs() > MAX_HALF {
        f64::INFINITY.copysign(value)
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_dtypes() {
        assert_eq!(Value::Bool(true).dtype(), DType::Bool);
        assert_eq!(Value::Int(3).dtype(), DType::Int64);
        assert_eq!(Value::Float(1.5).dtype(), DType::Float64);
        assert_eq!(Value::Complex(Complex::new(1.0, 2.0)).dtype(), DType::Complex128);
        assert_eq!(Value::Str("x".into()).dtype(), DType::Object);
        assert_eq!(Value::None.dtype(), DType::Object);
    }

    #[test]
    fn test_array_dtype() {
        let array = NdArray::from_vec(DType::Float32, ArrayData::Float(vec![1.0, 2.0]));
        assert_eq!(Value::Array(array).dtype(), DType::Float32);
    }

    #[test]
    fn test_list_dtype_inference() {
        let ints = Value::List(vec![Value::Int(1), Value::Bool(true)]);
        assert_eq!(ints.dtype(), DType::Int64);

        let floats = Value::List(vec![Value::Int(1), Value::Float(2.5)]);
        assert_eq!(floats.dtype(), DType::Float64);

        let mixed = Value::List(vec![Value::Int(1), Value::Str("a".into())]);
        assert_eq!(mixed.dtype(), DType::Object);
    }

    #[test]
    fn test_empty_list_is_float64() {
        assert_eq!(Value::List(Vec::new()).dtype(), DType::Float64);
    }

    #[test]
    fn test_astype_float32_rounds() {
        let value = Value::Float(0.1);
        let cast = value.astype(&[DType::Float32]).unwrap();
        match cast {
            Value::Array(array) => {
                assert_eq!(array.dtype, DType::Float32);
                assert!(array.shape.is_empty());
                assert_eq!(array.data, ArrayData::Float(vec![0.1f32 as f64]));
            }
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_astype_float16_rounds() {
        let array = NdArray::from_vec(DType::Float64, ArrayData::Float(vec![0.1, 70000.0, 1.0]));
        let half = array.astype(DType::Float16);
        match half.data {
            ArrayData::Float(data) => {
                assert_eq!(data[0], 0.0999755859375);
                assert!(data[1].is_infinite());
                assert_eq!(data[2], 1.0);
            }
            other => panic!("Expected float data, got {:?}", other),
        }
    }

    #[test]
    fn test_astype_float16_rounds_once() {
        // 889.4999.. quanta of 2^-24 rounds down to 889
        let array = NdArray::from_vec(DType::Float64, ArrayData::Float(vec![5.3018331309198154e-5]));
        let half = array.astype(DType::Float16);
        assert_eq!(half.data, ArrayData::Float(vec![889.0 * 2f64.powi(-24)]));
    }

    #[test]
    fn test_astype_large_uint_to_object_is_lossless() {
        let array = NdArray::from_vec(DType::UInt64, ArrayData::UInt(vec![7, u64::MAX]));
        let objects = array.astype(DType::Object);

        match objects.data {
            ArrayData::Object(items) => {
                assert_eq!(items[0], Value::Int(7));
                match &items[1] {
                    Value::Array(scalar) => {
                        assert_eq!(scalar.dtype, DType::UInt64);
                        assert_eq!(scalar.data, ArrayData::UInt(vec![u64::MAX]));
                    }
                    other => panic!("Expected uint64 scalar, got {:?}", other),
                }
            }
            other => panic!("Expected object data, got {:?}", other),
        }
    }

    #[test]
    fn test_astype_integer_wraps() {
        let array = NdArray::from_vec(DType::Int64, ArrayData::Int(vec![300, -1]));
        assert_eq!(array.astype(DType::Int8).data, ArrayData::Int(vec![44, -1]));
        assert_eq!(array.astype(DType::UInt8).data, ArrayData::UInt(vec![44, 255]));
    }

    #[test]
    fn test_astype_float_to_int_truncates() {
        let array = NdArray::from_vec(DType::Float64, ArrayData::Float(vec![2.7, -2.7]));
        assert_eq!(array.astype(DType::Int32).data, ArrayData::Int(vec![2, -2]));
    }

    #[test]
    fn test_astype_tuple_elementwise() {
        let value = Value::Tuple(vec![Value::Float(1.5), Value::Int(2)]);
        let cast = value.astype(&[DType::Float64, DType::Float64]).unwrap();
        match cast {
            Value::Tuple(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].dtype(), DType::Float64);
            }
            other => panic!("Expected tuple, got {:?}", other),
        }
    }

    #[test]
    fn test_astype_tuple_arity_mismatch() {
        let value = Value::Tuple(vec![Value::Float(1.5), Value::Int(2)]);
        assert!(value.astype(&[DType::Float64]).is_none());
    }

    #[test]
    fn test_astype_non_numeric() {
        assert!(Value::Str("x".into()).astype(&[DType::Float64]).is_none());
        assert!(Value::Float(1.0).astype(&[]).is_none());
    }

    #[test]
    fn test_value_serialization() {
        let value = Value::Tuple(vec![Value::Int(1), Value::Str("a".into())]);
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"tuple\""));
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
