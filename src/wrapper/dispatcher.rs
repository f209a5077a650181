//! Generic call dispatch
//!
//! The [`Dispatcher`] stands between a caller and the original callable. Every
//! entry point follows the same steps: resolve the target and its display
//! metadata, bind the arguments, capture the caller's stack, take a sequence
//! time, emit the inputs record, invoke the target, normalize its output and
//! emit the outputs record. The target's own result or error is handed back to
//! the caller unchanged.
//!
//! The entry points differ only in how the target is resolved and invoked:
//!
//! - [`Dispatcher::call`]: target and display metadata given by the caller
//! - [`Dispatcher::call_function`]: target resolved through the identity cache
//! - [`Dispatcher::call_instance`]: metadata read from the callable itself
//! - [`Dispatcher::call_class_method`]: resolved through the identity cache, retried
//!   once without the leading argument on a type error
//! - [`Dispatcher::call_vectorized`]: result re-typed from the primitive's type table

use super::backtrace::{BacktraceProvider, Frame, NoBacktrace, StackBacktrace};
use super::binding::Binding;
use super::output::normalize_output;
use super::registry::{FunctionInfo, IdentityCache};
use super::sequencer::EventSequencer;
use crate::callable::Callable;
use crate::config::TracerConfig;
use crate::dtype::{resolve_output_types, type_codes, DType};
use crate::error::Result;
use crate::tracer::{CallRecord, Recorder};
use crate::value::{Value, ValueMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Calling convention of an instrumented target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchKind {
    /// Module-level function resolved through the identity cache
    Function,
    /// Bound method; name and module come from the callable itself
    Instance,
    /// Method reached through its class; `self` may or may not be in the arguments
    ClassMethod,
    /// Elementwise numeric primitive with a type table
    Vectorized,
}

enum Invocation {
    Once,
    RetryWithoutLeading,
    Retype(Vec<DType>),
}

/// Intercepts calls and emits inputs/outputs records for each of them
pub struct Dispatcher {
    recorder: Arc<dyn Recorder>,
    cache: Arc<dyn IdentityCache>,
    backtrace: Arc<dyn BacktraceProvider>,
    sequencer: Arc<EventSequencer>,
    config: TracerConfig,
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// # Arguments
    ///
    /// * `recorder` - Receives the inputs and outputs records
    /// * `cache` - Resolves identity tokens for module functions and class methods
    /// * `config` - Backtrace capture and output re-typing settings
    pub fn new(recorder: Arc<dyn Recorder>, cache: Arc<dyn IdentityCache>, config: TracerConfig) -> Self {
        let backtrace: Arc<dyn BacktraceProvider> = if config.capture_backtrace {
            Arc::new(StackBacktrace::new(config.max_backtrace_depth))
        } else {
            Arc::new(NoBacktrace)
        };

        Self {
            recorder,
            cache,
            backtrace,
            sequencer: Arc::new(EventSequencer::new()),
            config,
        }
    }

    pub fn with_backtrace_provider(mut self, backtrace: Arc<dyn BacktraceProvider>) -> Self {
        self.backtrace = backtrace;
        self
    }

    /// Share a sequencer, e.g. between several dispatchers feeding one trace
    pub fn with_sequencer(mut self, sequencer: Arc<EventSequencer>) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &Arc<EventSequencer> {
        &self.sequencer
    }

    /// Trace a call to `function`, displayed as `module_name.function_name`
    pub fn call(
        &self,
        function: Arc<dyn Callable>,
        module_name: &str,
        function_name: &str,
        args: Vec<Value>,
        kwargs: ValueMap,
    ) -> Result<Value> {
        self.intercept(function, module_name, function_name, args, kwargs, Invocation::Once)
    }

    /// Trace a call to the module function registered as `info`
    pub fn call_function(&self, info: &FunctionInfo, args: Vec<Value>, kwargs: ValueMap) -> Result<Value> {
        let function = self.cache.lookup(&info.id)?;
        self.intercept(function, &info.module, &info.name, args, kwargs, Invocation::Once)
    }

    /// Trace a call to a bound callable, reading its name and module from the callable
    pub fn call_instance(&self, instance: Arc<dyn Callable>, args: Vec<Value>, kwargs: ValueMap) -> Result<Value> {
        let (module_name, function_name) = display_metadata(instance.as_ref());
        self.call(instance, &module_name, &function_name, args, kwargs)
    }

    /// Trace a call to the class method registered as `info`
    ///
    /// If the first attempt fails with a type error, the call is retried once
    /// without its leading positional argument. If the retry fails too, the error
    /// of the first attempt is returned.
    pub fn call_class_method(&self, info: &FunctionInfo, args: Vec<Value>, kwargs: ValueMap) -> Result<Value> {
        let function = self.cache.lookup(&info.id)?;
        self.intercept(
            function,
            &info.module,
            &info.name,
            args,
            kwargs,
            Invocation::RetryWithoutLeading,
        )
    }

    /// Trace a call to a vectorized primitive
    ///
    /// When positional inputs are given and the primitive declares a type table,
    /// the result is re-cast to the output type resolved from the inputs' element
    /// types before it is recorded and returned. If no type can be resolved the
    /// raw result is kept.
    pub fn call_vectorized(&self, function: Arc<dyn Callable>, args: Vec<Value>, kwargs: ValueMap) -> Result<Value> {
        let (module_name, function_name) = display_metadata(function.as_ref());
        let input_types: Vec<DType> = args.iter().map(Value::dtype).collect();
        self.intercept(
            function,
            &module_name,
            &function_name,
            args,
            kwargs,
            Invocation::Retype(input_types),
        )
    }

    /// Trace a call to a registered target using its calling convention
    pub fn dispatch(&self, kind: DispatchKind, info: &FunctionInfo, args: Vec<Value>, kwargs: ValueMap) -> Result<Value> {
        match kind {
            DispatchKind::Function => self.call_function(info, args, kwargs),
            DispatchKind::ClassMethod => self.call_class_method(info, args, kwargs),
            DispatchKind::Instance => self.call_instance(self.cache.lookup(&info.id)?, args, kwargs),
            DispatchKind::Vectorized => self.call_vectorized(self.cache.lookup(&info.id)?, args, kwargs),
        }
    }

    fn intercept(
        &self,
        target: Arc<dyn Callable>,
        module_name: &str,
        function_name: &str,
        args: Vec<Value>,
        kwargs: ValueMap,
        invocation: Invocation,
    ) -> Result<Value> {
        if !self.config.enabled {
            return target.call(&args, &kwargs);
        }

        let Binding {
            arguments,
            args,
            kwargs,
        } = Binding::new(target.as_ref(), args, kwargs)?;
        let backtrace: Arc<[Frame]> = self.backtrace.backtrace().into();

        if self.cache.is_instrumented(&target) {
            error!("Function {}.{} is wrapped itself", module_name, function_name);
        }

        let time = self.sequencer.next_event();
        debug!("Intercepted {}.{} at time {}", module_name, function_name, time);

        self.recorder
            .inputs(self.record(time, module_name, function_name, &target, arguments, &backtrace));

        let outputs = match invocation {
            Invocation::Once => target.call(&args, &kwargs)?,
            Invocation::RetryWithoutLeading => match target.call(&args, &kwargs) {
                Err(first) if first.is_type_error() => {
                    warn!(
                        "Retrying {}.{} without its leading argument: {}",
                        module_name, function_name, first
                    );
                    let rest = args.get(1..).unwrap_or_default();
                    target.call(rest, &kwargs).map_err(|_| first)?
                }
                result => result?,
            },
            Invocation::Retype(input_types) => {
                let raw = target.call(&args, &kwargs)?;
                if input_types.is_empty() || !self.config.retype_vectorized_outputs {
                    raw
                } else {
                    retype_output(target.as_ref(), &input_types, raw)
                }
            }
        };

        self.recorder.outputs(self.record(
            time,
            module_name,
            function_name,
            &target,
            normalize_output(&outputs),
            &backtrace,
        ));

        Ok(outputs)
    }

    fn record(
        &self,
        time: u64,
        module_name: &str,
        function_name: &str,
        function: &Arc<dyn Callable>,
        args: ValueMap,
        backtrace: &Arc<[Frame]>,
    ) -> CallRecord {
        CallRecord {
            time,
            module_name: module_name.to_string(),
            function_name: function_name.to_string(),
            function: Arc::clone(function),
            args,
            backtrace: Arc::clone(backtrace),
        }
    }
}

/// Module and display name a callable reports about itself
///
/// Falls back to the module of the implementing type when the callable declares
/// no module of its own.
fn display_metadata(function: &dyn Callable) -> (String, String) {
    let module = match function.module() {
        Some(module) if !module.is_empty() => module.to_string(),
        _ => function.type_module().to_string(),
    };
    (module, function.name().to_string())
}

/// Re-cast a vectorized primitive's raw result to its resolved output type
fn retype_output(function: &dyn Callable, input_types: &[DType], raw: Value) -> Value {
    let Some(table) = function.type_table() else {
        debug!("'{}' has no type table, keeping raw output", function.name());
        return raw;
    };

    match resolve_output_types(input_types, table) {
        Some(output_types) => match raw.astype(&output_types) {
            Some(retyped) => retyped,
            None => {
                debug!(
                    "Cannot re-cast output of '{}' to {}",
                    function.name(),
                    type_codes(&output_types)
                );
                raw
            }
        },
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::{NativeFunction, Signature};
    use crate::dtype::TypeTable;
    use crate::error::TracerError;
    use crate::tracer::{Phase, TracerSystem};
    use crate::value::{ArrayData, NdArray};
    use crate::wrapper::registry::FunctionRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Harness {
        tracer: Arc<TracerSystem>,
        registry: Arc<FunctionRegistry>,
        dispatcher: Dispatcher,
    }

    fn harness_with(config: TracerConfig) -> Harness {
        let tracer = Arc::new(TracerSystem::default());
        let registry = Arc::new(FunctionRegistry::new());
        let dispatcher = Dispatcher::new(tracer.clone(), registry.clone(), config)
            .with_backtrace_provider(Arc::new(NoBacktrace));
        Harness {
            tracer,
            registry,
            dispatcher,
        }
    }

    fn harness() -> Harness {
        harness_with(TracerConfig::default())
    }

    fn kwargs(pairs: &[(&str, Value)]) -> ValueMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn as_f64(value: &Value) -> f64 {
        match value {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Complex(c) => c.re,
            Value::Array(array) => match &array.data {
                ArrayData::Float(data) => data[0],
                ArrayData::Int(data) => data[0] as f64,
                other => panic!("unexpected array data {:?}", other),
            },
            other => panic!("not numeric: {:?}", other),
        }
    }

    fn add() -> Arc<dyn Callable> {
        Arc::new(
            NativeFunction::new("add", |args, _| match args {
                [a, b] => Ok(Value::Int(as_f64(a) as i64 + as_f64(b) as i64)),
                _ => Err(TracerError::TypeError(format!("add takes 2 arguments, got {}", args.len()))),
            })
            .with_module("numerics")
            .with_signature(Signature::new().positional("a").positional("b")),
        )
    }

    /// Elementwise add computing in double precision, like a primitive's inner loop
    fn vectorized_add() -> Arc<dyn Callable> {
        Arc::new(
            NativeFunction::new("add", |args, _| {
                let sum: f64 = args.iter().map(as_f64).sum();
                Ok(Value::Array(NdArray::scalar(DType::Float64, ArrayData::Float(vec![sum]))))
            })
            .with_module("numerics.vectorized")
            .with_type_table(TypeTable::parse(&["ll->l", "dd->d"]).unwrap()),
        )
    }

    #[test]
    fn test_plain_call_records_inputs_and_outputs() {
        let h = harness();
        let result = h
            .dispatcher
            .call(add(), "numerics", "add", vec![Value::Int(2)], kwargs(&[("b", Value::Int(3))]))
            .unwrap();

        assert_eq!(result, Value::Int(5));
        assert_eq!(h.tracer.len(), 2);

        let (inputs, outputs) = h.tracer.call_pair(0);
        let inputs = inputs.unwrap();
        let outputs = outputs.unwrap();

        assert_eq!(inputs.module_name, "numerics");
        assert_eq!(inputs.function_name, "add");
        assert_eq!(inputs.args, kwargs(&[("a", Value::Int(2)), ("b", Value::Int(3))]));
        assert_eq!(outputs.args, kwargs(&[("Ret", Value::Int(5))]));
        assert_eq!(outputs.phase, Phase::Outputs);
    }

    #[test]
    fn test_times_are_strictly_increasing() {
        let h = harness();
        for i in 0..5 {
            h.dispatcher
                .call(add(), "numerics", "add", vec![Value::Int(i), Value::Int(1)], ValueMap::new())
                .unwrap();
        }

        let times: Vec<u64> = h
            .tracer
            .get_events(None, None, None)
            .iter()
            .filter(|e| e.phase == Phase::Inputs)
            .map(|e| e.time)
            .collect();

        assert_eq!(times, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_unintrospectable_callable_uses_positional_names() {
        let h = harness();
        let opaque: Arc<dyn Callable> = Arc::new(NativeFunction::new("opaque", |args, _| Ok(Value::Tuple(args.to_vec()))));

        let result = h
            .dispatcher
            .call(opaque, "ext", "opaque", vec![Value::Int(1), Value::Int(2)], kwargs(&[("out", Value::None)]))
            .unwrap();

        assert_eq!(result, Value::Tuple(vec![Value::Int(1), Value::Int(2)]));

        let (inputs, outputs) = h.tracer.call_pair(0);
        let inputs = inputs.unwrap();
        let mut names: Vec<&String> = inputs.args.keys().collect();
        names.sort();
        assert_eq!(names, vec!["Arg0", "Arg1", "out"]);
        assert_eq!(
            outputs.unwrap().args,
            kwargs(&[("Ret0", Value::Int(1)), ("Ret1", Value::Int(2))])
        );
    }

    #[test]
    fn test_mapping_output_recorded_unchanged() {
        let h = harness();
        let stats: Arc<dyn Callable> = Arc::new(NativeFunction::new("stats", |_, _| {
            Ok(Value::Map(ValueMap::from([("mean".to_string(), Value::Float(0.5))])))
        }));

        h.dispatcher.call(stats, "m", "stats", vec![], ValueMap::new()).unwrap();

        let (_, outputs) = h.tracer.call_pair(0);
        assert_eq!(outputs.unwrap().args, kwargs(&[("mean", Value::Float(0.5))]));
    }

    #[test]
    fn test_module_function_via_registry() {
        let h = harness();
        let info = h.registry.register(add(), "numerics.core", "add");

        let result = h
            .dispatcher
            .call_function(&info, vec![Value::Int(1), Value::Int(1)], ValueMap::new())
            .unwrap();

        assert_eq!(result, Value::Int(2));
        let (inputs, _) = h.tracer.call_pair(0);
        let inputs = inputs.unwrap();
        assert_eq!(inputs.module_name, "numerics.core");
        assert_eq!(inputs.function_name, "add");
    }

    #[test]
    fn test_identity_cache_miss_propagates() {
        let h = harness();
        let unknown = FunctionInfo {
            id: crate::wrapper::registry::FunctionId::new(),
            module: "m".to_string(),
            name: "f".to_string(),
        };

        let err = h.dispatcher.call_function(&unknown, vec![], ValueMap::new()).unwrap_err();
        assert!(matches!(err, TracerError::LookupError(_)));
        assert!(h.tracer.is_empty());
    }

    #[test]
    fn test_instance_reads_metadata_from_callable() {
        let h = harness();
        h.dispatcher
            .call_instance(add(), vec![Value::Int(1), Value::Int(2)], ValueMap::new())
            .unwrap();

        let (inputs, _) = h.tracer.call_pair(0);
        let inputs = inputs.unwrap();
        assert_eq!(inputs.module_name, "numerics");
        assert_eq!(inputs.function_name, "add");
    }

    #[test]
    fn test_instance_module_falls_back_to_type_module() {
        let h = harness();
        let no_module: Arc<dyn Callable> = Arc::new(NativeFunction::new("step", |_, _| Ok(Value::None)));

        h.dispatcher.call_instance(no_module, vec![], ValueMap::new()).unwrap();

        let (inputs, _) = h.tracer.call_pair(0);
        let inputs = inputs.unwrap();
        assert_eq!(inputs.module_name, "calltracer::callable");
        assert_eq!(inputs.function_name, "step");
    }

    fn method_expecting_one_argument(attempts: Arc<AtomicUsize>) -> Arc<dyn Callable> {
        Arc::new(NativeFunction::new("scale", move |args, _| {
            attempts.fetch_add(1, Ordering::SeqCst);
            match args {
                [x] => Ok(Value::Float(as_f64(x) * 2.0)),
                _ => Err(TracerError::TypeError(format!("scale takes 1 argument, got {}", args.len()))),
            }
        }))
    }

    #[test]
    fn test_class_method_retries_without_leading_argument() {
        let h = harness();
        let attempts = Arc::new(AtomicUsize::new(0));
        let info = h
            .registry
            .register(method_expecting_one_argument(attempts.clone()), "solver", "Solver.scale");

        let result = h
            .dispatcher
            .call_class_method(&info, vec![Value::from("self"), Value::Float(1.5)], ValueMap::new())
            .unwrap();

        assert_eq!(result, Value::Float(3.0));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(h.tracer.len(), 2);

        let (inputs, _) = h.tracer.call_pair(0);
        assert_eq!(inputs.unwrap().args.len(), 2);
    }

    #[test]
    fn test_class_method_second_failure_returns_first_error() {
        let h = harness();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let always_fails: Arc<dyn Callable> = Arc::new(NativeFunction::new("broken", move |_, _| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            Err(TracerError::TypeError(format!("attempt {}", attempt)))
        }));
        let info = h.registry.register(always_fails, "solver", "Solver.broken");

        let err = h
            .dispatcher
            .call_class_method(&info, vec![Value::Int(1), Value::Int(2)], ValueMap::new())
            .unwrap_err();

        assert_eq!(err.to_string(), "Type error: attempt 0");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        let (inputs, outputs) = h.tracer.call_pair(0);
        assert!(inputs.is_some());
        assert!(outputs.is_none());
    }

    #[test]
    fn test_class_method_does_not_retry_other_failures() {
        let h = harness();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let diverges: Arc<dyn Callable> = Arc::new(NativeFunction::new("solve", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(TracerError::CallFailed("did not converge".to_string()))
        }));
        let info = h.registry.register(diverges, "solver", "Solver.solve");

        let err = h
            .dispatcher
            .call_class_method(&info, vec![Value::Int(1)], ValueMap::new())
            .unwrap_err();

        assert!(matches!(err, TracerError::CallFailed(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_plain_call_does_not_retry() {
        let h = harness();
        let attempts = Arc::new(AtomicUsize::new(0));

        let err = h
            .dispatcher
            .call(
                method_expecting_one_argument(attempts.clone()),
                "solver",
                "scale",
                vec![Value::Int(1), Value::Int(2)],
                ValueMap::new(),
            )
            .unwrap_err();

        assert!(err.is_type_error());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_binding_ambiguity_propagates_before_recording() {
        let h = harness();
        let err = h
            .dispatcher
            .call(
                add(),
                "numerics",
                "add",
                vec![Value::Int(1), Value::Int(2)],
                kwargs(&[("a", Value::Int(3))]),
            )
            .unwrap_err();

        assert!(matches!(err, TracerError::BindingError(_)));
        assert!(h.tracer.is_empty());
        assert_eq!(h.dispatcher.sequencer().peek(), 0);
    }

    #[test]
    fn test_vectorized_exact_match_retypes_to_integer() {
        let h = harness();
        let result = h
            .dispatcher
            .call_vectorized(vectorized_add(), vec![Value::Int(2), Value::Int(3)], ValueMap::new())
            .unwrap();

        match &result {
            Value::Array(array) => {
                assert_eq!(array.dtype, DType::Int64);
                assert_eq!(array.data, ArrayData::Int(vec![5]));
            }
            other => panic!("Expected array, got {:?}", other),
        }

        let (inputs, outputs) = h.tracer.call_pair(0);
        assert_eq!(inputs.unwrap().module_name, "numerics.vectorized");
        assert_eq!(outputs.unwrap().args["Ret"], result);
    }

    #[test]
    fn test_vectorized_casting_fallback() {
        let h = harness();
        let x = NdArray::scalar(DType::Float32, ArrayData::Float(vec![1.5]));

        let result = h
            .dispatcher
            .call_vectorized(vectorized_add(), vec![Value::Array(x), Value::Int(2)], ValueMap::new())
            .unwrap();

        assert_eq!(result.dtype(), DType::Float64);
        assert_eq!(as_f64(&result), 3.5);
    }

    #[test]
    fn test_vectorized_unresolvable_keeps_raw_result() {
        let h = harness();
        let z = Value::Complex(crate::value::Complex::new(1.0, 1.0));

        let result = h
            .dispatcher
            .call_vectorized(vectorized_add(), vec![z, Value::Int(2)], ValueMap::new())
            .unwrap();

        assert_eq!(result.dtype(), DType::Float64);
        assert_eq!(h.tracer.len(), 2);
    }

    #[test]
    fn test_vectorized_without_positional_inputs_is_not_retyped() {
        let h = harness();
        let result = h
            .dispatcher
            .call_vectorized(vectorized_add(), vec![], ValueMap::new())
            .unwrap();

        assert_eq!(result.dtype(), DType::Float64);
    }

    #[test]
    fn test_vectorized_retyping_can_be_disabled() {
        let h = harness_with(TracerConfig {
            retype_vectorized_outputs: false,
            ..TracerConfig::default()
        });

        let result = h
            .dispatcher
            .call_vectorized(vectorized_add(), vec![Value::Int(2), Value::Int(3)], ValueMap::new())
            .unwrap();

        assert_eq!(result.dtype(), DType::Float64);
    }

    #[test]
    fn test_disabled_dispatcher_passes_calls_through() {
        let h = harness_with(TracerConfig {
            enabled: false,
            ..TracerConfig::default()
        });

        let result = h
            .dispatcher
            .call(add(), "numerics", "add", vec![Value::Int(2), Value::Int(2)], ValueMap::new())
            .unwrap();

        assert_eq!(result, Value::Int(4));
        assert!(h.tracer.is_empty());
    }

    #[test]
    fn test_dispatch_by_kind() {
        let h = harness();
        let add_info = h.registry.register(add(), "numerics", "add");
        let vec_info = h.registry.register(vectorized_add(), "numerics.vectorized", "add");

        let args = || vec![Value::Int(1), Value::Int(2)];
        assert_eq!(
            h.dispatcher.dispatch(DispatchKind::Function, &add_info, args(), ValueMap::new()).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            h.dispatcher.dispatch(DispatchKind::Instance, &add_info, args(), ValueMap::new()).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            h.dispatcher.dispatch(DispatchKind::ClassMethod, &add_info, args(), ValueMap::new()).unwrap(),
            Value::Int(3)
        );
        let vectorized = h
            .dispatcher
            .dispatch(DispatchKind::Vectorized, &vec_info, args(), ValueMap::new())
            .unwrap();
        assert_eq!(vectorized.dtype(), DType::Int64);

        assert_eq!(h.tracer.len(), 8);
    }

    #[test]
    fn test_backtrace_shared_by_inputs_and_outputs() {
        let tracer = Arc::new(TracerSystem::default());
        let registry = Arc::new(FunctionRegistry::new());
        let dispatcher = Dispatcher::new(tracer.clone(), registry, TracerConfig::default());

        dispatcher
            .call(add(), "numerics", "add", vec![Value::Int(1), Value::Int(2)], ValueMap::new())
            .unwrap();

        let (inputs, outputs) = tracer.call_pair(0);
        let inputs = inputs.unwrap();
        assert!(inputs.backtrace.len() <= 64);
        assert_eq!(inputs.backtrace, outputs.unwrap().backtrace);
    }

    #[test]
    fn test_shared_sequencer_across_dispatchers() {
        let tracer = Arc::new(TracerSystem::default());
        let registry = Arc::new(FunctionRegistry::new());
        let sequencer = Arc::new(EventSequencer::new());
        let config = TracerConfig {
            capture_backtrace: false,
            ..TracerConfig::default()
        };

        let first = Dispatcher::new(tracer.clone(), registry.clone(), config.clone())
            .with_sequencer(sequencer.clone());
        let second = Dispatcher::new(tracer.clone(), registry, config).with_sequencer(sequencer.clone());

        first.call(add(), "m", "add", vec![Value::Int(1), Value::Int(1)], ValueMap::new()).unwrap();
        second.call(add(), "m", "add", vec![Value::Int(1), Value::Int(1)], ValueMap::new()).unwrap();

        assert_eq!(sequencer.peek(), 2);
        assert!(tracer.call_pair(1).0.is_some());
    }
}
