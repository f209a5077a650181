//! Argument binding
//!
//! Reconciles the positional and keyword arguments of one call against the
//! callable's declared parameters, producing the name-to-value mapping that is
//! recorded and the `args`/`kwargs` split used to replay the call.

use crate::callable::{Callable, ParameterKind, Signature};
use crate::error::{Result, TracerError};
use crate::value::{Value, ValueMap};
use tracing::debug;

/// Arguments of a single call, keyed by parameter name
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Parameter name to bound value; only parameters supplied by the call
    pub arguments: ValueMap,
    /// Positional values to replay the call with
    pub args: Vec<Value>,
    /// Keyword values to replay the call with
    pub kwargs: ValueMap,
}

impl Binding {
    /// Bind a call's arguments to `function`'s parameters
    ///
    /// Falls back to sequential `Arg0`, `Arg1`, ... names when the callable has no
    /// introspectable signature. Ambiguous calls (duplicate values, unknown
    /// keywords, missing required parameters) fail with a binding error.
    pub fn new(function: &dyn Callable, args: Vec<Value>, kwargs: ValueMap) -> Result<Self> {
        match function.signature() {
            Some(signature) => Self::bind(&signature, args, kwargs),
            None => {
                debug!("No signature for '{}', naming arguments by position", function.name());
                Ok(Self::positional(args, kwargs))
            }
        }
    }

    /// Bind against a known signature
    pub fn bind(signature: &Signature, args: Vec<Value>, mut kwargs: ValueMap) -> Result<Self> {
        // Keywords equal to their parameter's default are not bound
        for parameter in signature.parameters() {
            let redundant = parameter.default.is_some()
                && kwargs.get(&parameter.name) == parameter.default.as_ref();
            if redundant {
                kwargs.remove(&parameter.name);
            }
        }

        let arguments = bind_arguments(signature, args, kwargs)?;
        let (args, kwargs) = replay_split(signature, &arguments);

        Ok(Self {
            arguments,
            args,
            kwargs,
        })
    }

    /// Binding without a signature: positional arguments become `Arg0..ArgN`
    pub fn positional(args: Vec<Value>, kwargs: ValueMap) -> Self {
        let mut arguments: ValueMap = args
            .iter()
            .enumerate()
            .map(|(i, value)| (format!("Arg{}", i), value.clone()))
            .collect();
        arguments.extend(kwargs.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            arguments,
            args,
            kwargs,
        }
    }
}

fn bind_arguments(signature: &Signature, args: Vec<Value>, mut kwargs: ValueMap) -> Result<ValueMap> {
    let parameters = signature.parameters();
    let mut arguments = ValueMap::new();
    let mut positional = args.into_iter();

    for parameter in parameters.iter().filter(|p| p.kind.is_positional()) {
        match positional.next() {
            Some(value) => {
                arguments.insert(parameter.name.clone(), value);
            }
            None => break,
        }
    }

    let surplus: Vec<Value> = positional.collect();
    match parameters.iter().find(|p| p.kind == ParameterKind::VarPositional) {
        Some(parameter) => {
            if !surplus.is_empty() {
                arguments.insert(parameter.name.clone(), Value::Tuple(surplus));
            }
        }
        None if !surplus.is_empty() => {
            return Err(TracerError::BindingError("too many positional arguments".to_string()));
        }
        None => {}
    }

    let var_keyword = parameters.iter().find(|p| p.kind == ParameterKind::VarKeyword);

    for parameter in parameters {
        match parameter.kind {
            ParameterKind::VarPositional | ParameterKind::VarKeyword => continue,
            ParameterKind::PositionalOnly => {
                if kwargs.contains_key(&parameter.name) && var_keyword.is_none() {
                    return Err(TracerError::BindingError(format!(
                        "'{}' parameter is positional only, but was passed as a keyword",
                        parameter.name
                    )));
                }
                if !arguments.contains_key(&parameter.name) && parameter.is_required() {
                    return Err(missing_argument(&parameter.name));
                }
            }
            ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly => {
                match kwargs.remove(&parameter.name) {
                    Some(value) => {
                        if arguments.contains_key(&parameter.name) {
                            return Err(TracerError::BindingError(format!(
                                "multiple values for argument '{}'",
                                parameter.name
                            )));
                        }
                        arguments.insert(parameter.name.clone(), value);
                    }
                    None => {
                        if !arguments.contains_key(&parameter.name) && parameter.is_required() {
                            return Err(missing_argument(&parameter.name));
                        }
                    }
                }
            }
        }
    }

    if !kwargs.is_empty() {
        match var_keyword {
            Some(parameter) => {
                arguments.insert(parameter.name.clone(), Value::Map(kwargs));
            }
            None => {
                let mut unexpected: Vec<&String> = kwargs.keys().collect();
                unexpected.sort();
                return Err(TracerError::BindingError(format!(
                    "got an unexpected keyword argument '{}'",
                    unexpected[0]
                )));
            }
        }
    }

    Ok(arguments)
}

fn missing_argument(name: &str) -> TracerError {
    TracerError::BindingError(format!("missing a required argument: '{}'", name))
}

/// Split bound arguments into the positional and keyword parts of a replay call
///
/// Positional parameters go to `args` until the first one that was not supplied;
/// everything after that, and all keyword-only parameters, go to `kwargs`.
fn replay_split(signature: &Signature, arguments: &ValueMap) -> (Vec<Value>, ValueMap) {
    let mut args = Vec::new();
    let mut kwargs = ValueMap::new();
    let mut keywords_started = false;

    for parameter in signature.parameters() {
        if !keywords_started {
            match parameter.kind {
                ParameterKind::KeywordOnly | ParameterKind::VarKeyword => keywords_started = true,
                _ => {
                    match arguments.get(&parameter.name) {
                        Some(Value::Tuple(values)) if parameter.kind == ParameterKind::VarPositional => {
                            args.extend(values.iter().cloned());
                        }
                        Some(value) => args.push(value.clone()),
                        None => keywords_started = true,
                    }
                    continue;
                }
            }
        }

        match (parameter.kind, arguments.get(&parameter.name)) {
            (ParameterKind::VarKeyword, Some(Value::Map(extra))) => {
                kwargs.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            (ParameterKind::VarPositional, _) | (_, None) => {}
            (_, Some(value)) => {
                kwargs.insert(parameter.name.clone(), value.clone());
            }
        }
    }

    (args, kwargs)
}
