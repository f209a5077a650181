//! The recording interface the dispatcher emits to

use crate::callable::Callable;
use crate::value::ValueMap;
use crate::wrapper::backtrace::Frame;
use std::fmt;
use std::sync::Arc;

/// Everything known about one side of an intercepted call
#[derive(Clone)]
pub struct CallRecord {
    pub time: u64,
    pub module_name: String,
    pub function_name: String,
    pub function: Arc<dyn Callable>,
    pub args: ValueMap,
    pub backtrace: Arc<[Frame]>,
}

impl fmt::Debug for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRecord")
            .field("time", &self.time)
            .field("module_name", &self.module_name)
            .field("function_name", &self.function_name)
            .field("function", &self.function.name())
            .field("args", &self.args)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

/// Receives the inputs and outputs records of intercepted calls
///
/// Both methods are fire-and-forget: the dispatcher never inspects what a
/// recorder does with a record.
pub trait Recorder: Send + Sync {
    /// Called before the original callable runs, with the bound arguments
    fn inputs(&self, record: CallRecord);

    /// Called after the original callable returns, with the normalized output
    fn outputs(&self, record: CallRecord);
}
