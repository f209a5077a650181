//! Callables that can be intercepted by the dispatcher
//!
//! Anything implementing [`Callable`] can be traced: free functions, bound methods,
//! class methods and vectorized primitives all share this interface. Callables may
//! declare a [`Signature`] so that positional and keyword arguments can be bound to
//! parameter names; callables without one are still traceable, with positional
//! arguments recorded as `Arg0`, `Arg1`, ...

use crate::dtype::TypeTable;
use crate::error::Result;
use crate::value::{Value, ValueMap};
use std::fmt;
use std::sync::Arc;

/// How a parameter accepts its argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    /// Collects surplus positional arguments
    VarPositional,
    KeywordOnly,
    /// Collects surplus keyword arguments
    VarKeyword,
}

impl ParameterKind {
    pub fn is_positional(self) -> bool {
        matches!(self, ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword)
    }
}

/// One declared parameter of a callable
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether a call must supply a value for this parameter
    pub fn is_required(&self) -> bool {
        self.default.is_none()
            && !matches!(self.kind, ParameterKind::VarPositional | ParameterKind::VarKeyword)
    }
}

/// Ordered parameter list of a callable
///
/// # Examples
///
/// ```
/// use calltracer::callable::Signature;
/// use calltracer::value::Value;
///
/// let signature = Signature::new()
///     .positional("x")
///     .optional("scale", Value::Float(1.0))
///     .var_keyword("options");
///
/// assert_eq!(signature.parameters().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required positional-or-keyword parameter
    pub fn positional(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::PositionalOrKeyword))
    }

    /// Add a positional-or-keyword parameter with a default value
    pub fn optional(self, name: impl Into<String>, default: Value) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::PositionalOrKeyword).with_default(default))
    }

    pub fn positional_only(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::PositionalOnly))
    }

    pub fn var_positional(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::VarPositional))
    }

    pub fn keyword_only(self, name: impl Into<String>, default: Option<Value>) -> Self {
        let mut parameter = Parameter::new(name, ParameterKind::KeywordOnly);
        parameter.default = default;
        self.parameter(parameter)
    }

    pub fn var_keyword(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::new(name, ParameterKind::VarKeyword))
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Trait for callables that can be traced
pub trait Callable: Send + Sync {
    /// Invoke the callable
    ///
    /// Arity and argument-type mismatches are reported as
    /// [`TracerError::TypeError`](crate::error::TracerError::TypeError).
    fn call(&self, args: &[Value], kwargs: &ValueMap) -> Result<Value>;

    /// Declared parameter list, if it can be introspected
    fn signature(&self) -> Option<Signature> {
        None
    }

    /// Display name
    fn name(&self) -> &str {
        ""
    }

    /// Module the callable is declared in, if it exposes one
    fn module(&self) -> Option<&str> {
        None
    }

    /// Module of the concrete type implementing this callable
    fn type_module(&self) -> &str {
        module_of_type(std::any::type_name::<Self>())
    }

    /// Type-signature table, present only for vectorized primitives
    fn type_table(&self) -> Option<&TypeTable> {
        None
    }
}

/// Module path of a fully qualified type name: `a::b::C<d::E>` becomes `a::b`
fn module_of_type(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit_once("::").map(|(module, _)| module).unwrap_or("")
}

type NativeFn = dyn Fn(&[Value], &ValueMap) -> Result<Value> + Send + Sync;

/// A [`Callable`] backed by a Rust closure
///
/// # Examples
///
/// ```
/// use calltracer::callable::{Callable, NativeFunction, Signature};
/// use calltracer::value::{Value, ValueMap};
///
/// let double = NativeFunction::new("double", |args, _kwargs| match args.first() {
///     Some(Value::Int(x)) => Ok(Value::Int(x * 2)),
///     _ => Ok(Value::None),
/// })
/// .with_signature(Signature::new().positional("x"));
///
/// let result = double.call(&[Value::Int(21)], &ValueMap::new()).unwrap();
/// assert_eq!(result, Value::Int(42));
/// ```
#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    module: Option<String>,
    signature: Option<Signature>,
    type_table: Option<TypeTable>,
    function: Arc<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value], &ValueMap) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            module: None,
            signature: None,
            type_table: None,
            function: Arc::new(function),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Mark this function as a vectorized primitive with the given type table
    pub fn with_type_table(mut self, type_table: TypeTable) -> Self {
        self.type_table = Some(type_table);
        self
    }
}

impl Callable for NativeFunction {
    fn call(&self, args: &[Value], kwargs: &ValueMap) -> Result<Value> {
        (self.function)(args, kwargs)
    }

    fn signature(&self) -> Option<Signature> {
        self.signature.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    fn type_table(&self) -> Option<&TypeTable> {
        self.type_table.as_ref()
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("signature", &self.signature)
            .field("type_table", &self.type_table)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TracerError;

    #[test]
    fn test_signature_builder() {
        let signature = Signature::new()
            .positional_only("a")
            .positional("b")
            .optional("c", Value::Int(3))
            .var_positional("rest")
            .keyword_only("flag", Some(Value::Bool(false)))
            .var_keyword("extra");

        let kinds: Vec<ParameterKind> = signature.parameters().iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParameterKind::PositionalOnly,
                ParameterKind::PositionalOrKeyword,
                ParameterKind::PositionalOrKeyword,
                ParameterKind::VarPositional,
                ParameterKind::KeywordOnly,
                ParameterKind::VarKeyword,
            ]
        );
        assert_eq!(signature.get("c").unwrap().default, Some(Value::Int(3)));
        assert!(signature.get("missing").is_none());
    }

    #[test]
    fn test_parameter_is_required() {
        assert!(Parameter::new("x", ParameterKind::PositionalOrKeyword).is_required());
        assert!(!Parameter::new("x", ParameterKind::PositionalOrKeyword)
            .with_default(Value::None)
            .is_required());
        assert!(!Parameter::new("args", ParameterKind::VarPositional).is_required());
        assert!(!Parameter::new("kwargs", ParameterKind::VarKeyword).is_required());
    }

    #[test]
    fn test_native_function_call() {
        let add = NativeFunction::new("add", |args, _| match args {
            [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
            _ => Err(TracerError::TypeError("add expects two integers".to_string())),
        });

        assert_eq!(add.call(&[Value::Int(2), Value::Int(3)], &ValueMap::new()).unwrap(), Value::Int(5));
        assert!(add.call(&[Value::Int(2)], &ValueMap::new()).unwrap_err().is_type_error());
    }

    #[test]
    fn test_native_function_metadata() {
        let f = NativeFunction::new("f", |_, _| Ok(Value::None))
            .with_module("numerics.linalg")
            .with_signature(Signature::new().positional("x"));

        assert_eq!(f.name(), "f");
        assert_eq!(f.module(), Some("numerics.linalg"));
        assert!(f.signature().is_some());
        assert!(f.type_table().is_none());
    }

    #[test]
    fn test_type_module_defaults_to_implementing_type() {
        let f = NativeFunction::new("f", |_, _| Ok(Value::None));
        assert_eq!(f.type_module(), "calltracer::callable");
    }

    #[test]
    fn test_module_of_type() {
        assert_eq!(module_of_type("a::b::C"), "a::b");
        assert_eq!(module_of_type("a::b::C<x::y::Z>"), "a::b");
        assert_eq!(module_of_type("C"), "");
    }
}
