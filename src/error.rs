//! Error types and result aliases for the call tracer.
//!
//! This module defines the core error type [`TracerError`] and the [`Result`] type alias
//! used throughout the library. Instrumented callables report their own failures through
//! the same type so that the dispatcher can pass them back to the caller untouched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TracerError {
    #[error("Binding error: {0}")]
    BindingError(String),

    #[error("Unknown function identity: {0}")]
    LookupError(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Call failed: {0}")]
    CallFailed(String),

    #[error("Invalid type signature: {0}")]
    InvalidTypeSignature(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TracerError {
    /// Whether this error is an arity or argument-type mismatch raised by a callable
    pub fn is_type_error(&self) -> bool {
        matches!(self, TracerError::TypeError(_))
    }
}

pub type Result<T> = std::result::Result<T, TracerError>;
