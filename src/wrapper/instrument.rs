//! Installing instrumentation on registered functions
//!
//! [`instrument`] replaces nothing in the host program: it builds an
//! [`InstrumentedFunction`] that routes every call through a [`Dispatcher`],
//! registers it next to its target and marks it as a wrapper. Call sites that
//! should be traced invoke the wrapper instead of the original.
//!
//! The registry owns the wrapper and the dispatcher owns the registry, so a
//! wrapper only holds a weak handle to its dispatcher. Calling a wrapper whose
//! dispatcher has been dropped fails with [`TracerError::CallFailed`].

use super::dispatcher::{DispatchKind, Dispatcher};
use super::registry::{FunctionInfo, FunctionRegistry, IdentityCache};
use crate::callable::{Callable, Signature};
use crate::dtype::TypeTable;
use crate::error::{Result, TracerError};
use crate::value::{Value, ValueMap};
use std::sync::{Arc, Weak};
use tracing::debug;

/// A callable that traces every call to its target
///
/// Metadata (signature, name, module and type table) is taken from the target at
/// installation time, so the wrapper binds arguments exactly like the original.
pub struct InstrumentedFunction {
    dispatcher: Weak<Dispatcher>,
    target: FunctionInfo,
    kind: DispatchKind,
    signature: Option<Signature>,
    module: Option<String>,
    type_table: Option<TypeTable>,
}

impl InstrumentedFunction {
    pub fn target(&self) -> &FunctionInfo {
        &self.target
    }

    pub fn kind(&self) -> DispatchKind {
        self.kind
    }
}

impl Callable for InstrumentedFunction {
    fn call(&self, args: &[Value], kwargs: &ValueMap) -> Result<Value> {
        let dispatcher = self.dispatcher.upgrade().ok_or_else(|| {
            TracerError::CallFailed(format!(
                "dispatcher for {}.{} has been dropped",
                self.target.module, self.target.name
            ))
        })?;
        dispatcher.dispatch(self.kind, &self.target, args.to_vec(), kwargs.clone())
    }

    fn signature(&self) -> Option<Signature> {
        self.signature.clone()
    }

    fn name(&self) -> &str {
        &self.target.name
    }

    fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    fn type_table(&self) -> Option<&TypeTable> {
        self.type_table.as_ref()
    }
}

/// Install a tracing wrapper for the function registered as `target`
///
/// Returns the registration of the wrapper. Instrumenting a wrapper again is
/// allowed; the dispatcher reports it as double instrumentation when it is called.
pub fn instrument(
    dispatcher: &Arc<Dispatcher>,
    registry: &FunctionRegistry,
    target: &FunctionInfo,
    kind: DispatchKind,
) -> Result<FunctionInfo> {
    let original = registry.lookup(&target.id)?;

    let wrapper: Arc<dyn Callable> = Arc::new(InstrumentedFunction {
        dispatcher: Arc::downgrade(dispatcher),
        target: target.clone(),
        kind,
        signature: original.signature(),
        module: original.module().map(str::to_string),
        type_table: original.type_table().cloned(),
    });

    let info = registry.register(wrapper, target.module.clone(), target.name.clone());
    registry.mark_instrumented(info.id);
    debug!("Instrumented {}.{} as {:?}", target.module, target.name, kind);

    Ok(info)
}
