//! Call interception
//!
//! Everything between a caller and an instrumented callable lives here:
//!
//! - **Binding**: maps a call's positional and keyword arguments to parameter names
//! - **normalize_output**: turns any return value into a name-to-value mapping
//! - **EventSequencer**: hands out the strictly increasing logical time of each call
//! - **FunctionRegistry**: identity tokens and the re-entrancy marker for wrappers
//! - **Dispatcher**: the generic wrapper behind every calling convention
//! - **instrument**: installs a tracing wrapper for a registered function
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use calltracer::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(FunctionRegistry::new());
//! let tracer = Arc::new(TracerSystem::default().with_registry(registry.clone()));
//! let dispatcher = Arc::new(Dispatcher::new(tracer.clone(), registry.clone(), TracerConfig::default()));
//!
//! let info = registry.register(my_function, "numerics", "add");
//! let traced = instrument(&dispatcher, &registry, &info, DispatchKind::Function)?;
//! ```

pub mod backtrace;
pub mod binding;
pub mod dispatcher;
pub mod instrument;
pub mod output;
pub mod registry;
pub mod sequencer;

pub use backtrace::{BacktraceProvider, Frame, NoBacktrace, StackBacktrace};
pub use binding::Binding;
pub use dispatcher::{DispatchKind, Dispatcher};
pub use instrument::{instrument, InstrumentedFunction};
pub use output::normalize_output;
pub use registry::{FunctionId, FunctionInfo, FunctionRegistry, IdentityCache};
pub use sequencer::EventSequencer;
