pub mod callable;
pub mod config;
pub mod dtype;
pub mod error;
pub mod tracer;
pub mod value;
pub mod wrapper;

pub use error::{Result, TracerError};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::callable::{Callable, NativeFunction, Parameter, ParameterKind, Signature};
    pub use crate::config::TracerConfig;
    pub use crate::dtype::{DType, TypeSignature, TypeTable};
    pub use crate::error::{Result, TracerError};
    pub use crate::tracer::{NullRecorder, Recorder, TraceEvent, TracerSystem};
    pub use crate::value::{ArrayData, Complex, NdArray, Value, ValueMap};
    pub use crate::wrapper::{
        instrument, DispatchKind, Dispatcher, EventSequencer, FunctionInfo, FunctionRegistry, IdentityCache,
    };
}
