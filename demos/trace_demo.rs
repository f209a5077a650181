//! Call tracing demonstration
//!
//! This example registers a few numerical functions, installs tracing wrappers
//! on them and shows the inputs/outputs records produced for each call:
//! - a module function called with a mix of positional and keyword arguments
//! - a method reached through its class, which needs the leading-argument retry
//! - a vectorized primitive whose result is re-cast from its type table
//!
//! # Running the example
//!
//! ```bash
//! RUST_LOG=calltracer=debug cargo run --example trace_demo
//! ```

use calltracer::prelude::*;
use calltracer::tracer::{EventFilterFn, Phase};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn as_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::Array(NdArray {
            data: ArrayData::Float(data),
            ..
        }) if data.len() == 1 => Ok(data[0]),
        other => Err(TracerError::TypeError(format!("expected a number, got {:?}", other))),
    }
}

fn axpy() -> Arc<dyn Callable> {
    Arc::new(
        NativeFunction::new("axpy", |args, kwargs| match args {
            [a, x] | [a, x, _] => {
                let y = kwargs.get("y").or(args.get(2)).map(as_f64).transpose()?.unwrap_or(0.0);
                Ok(Value::Float(as_f64(a)? * as_f64(x)? + y))
            }
            _ => Err(TracerError::TypeError(format!(
                "axpy takes 2 or 3 positional arguments but {} were given",
                args.len()
            ))),
        })
        .with_module("blas")
        .with_signature(
            Signature::new()
                .positional("a")
                .positional("x")
                .optional("y", Value::Float(0.0)),
        ),
    )
}

fn newton_step() -> Arc<dyn Callable> {
    Arc::new(
        NativeFunction::new("Solver.step", |args, _| match args {
            [x] => {
                let x = as_f64(x)?;
                Ok(Value::Tuple(vec![Value::Float(x - (x * x - 2.0) / (2.0 * x)), Value::Bool(false)]))
            }
            _ => Err(TracerError::TypeError(format!(
                "step takes 1 positional argument but {} were given",
                args.len()
            ))),
        })
        .with_module("solver"),
    )
}

fn vectorized_multiply() -> Result<Arc<dyn Callable>> {
    Ok(Arc::new(
        NativeFunction::new("multiply", |args, _| {
            let product = args.iter().map(as_f64).product::<Result<f64>>()?;
            Ok(Value::Array(NdArray::scalar(DType::Float64, ArrayData::Float(vec![product]))))
        })
        .with_module("numerics.vectorized")
        .with_signature(Signature::new().positional("x1").positional("x2"))
        .with_type_table(TypeTable::parse(&["ll->l", "dd->d", "DD->D"])?),
    ))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("calltracer=info".parse()?))
        .init();

    println!("{}", "=".repeat(80));
    println!("Call Tracing Demonstration");
    println!("{}", "=".repeat(80));
    println!();

    let registry = Arc::new(FunctionRegistry::new());
    let tracer = Arc::new(TracerSystem::default().with_registry(registry.clone()));
    let config = TracerConfig {
        capture_backtrace: false,
        ..TracerConfig::default()
    };
    let dispatcher = Arc::new(Dispatcher::new(tracer.clone(), registry.clone(), config));

    let axpy_info = registry.register(axpy(), "blas", "axpy");
    let step_info = registry.register(newton_step(), "solver", "Solver.step");
    let multiply_info = registry.register(vectorized_multiply()?, "numerics.vectorized", "multiply");

    let traced_axpy = instrument(&dispatcher, &registry, &axpy_info, DispatchKind::Function)?;
    let traced_step = instrument(&dispatcher, &registry, &step_info, DispatchKind::ClassMethod)?;
    let traced_multiply = instrument(&dispatcher, &registry, &multiply_info, DispatchKind::Vectorized)?;

    let axpy = registry.lookup(&traced_axpy.id)?;
    let y = ValueMap::from([("y".to_string(), Value::Float(1.0))]);
    println!("axpy(2, 3, y=1) = {:?}", axpy.call(&[Value::Int(2), Value::Float(3.0)], &y)?);

    let step = registry.lookup(&traced_step.id)?;
    let mut x = Value::Float(1.0);
    for _ in 0..3 {
        let result = step.call(&[Value::from("<Solver>"), x.clone()], &ValueMap::new())?;
        if let Value::Tuple(items) = result {
            x = items[0].clone();
        }
    }
    println!("Newton iterate after 3 steps = {:?}", x);

    let multiply = registry.lookup(&traced_multiply.id)?;
    println!(
        "multiply(6, 7) = {:?}",
        multiply.call(&[Value::Int(6), Value::Int(7)], &ValueMap::new())?
    );
    println!();

    println!("{}", "-".repeat(80));
    println!("Recorded events: {}", tracer.len());
    println!("{}", "-".repeat(80));
    for (i, summary) in tracer.get_event_summaries(None, None, None).iter().enumerate() {
        println!("{}. {}", i + 1, summary);
        println!();
    }

    let solver_outputs = |e: &TraceEvent| e.phase == Phase::Outputs && e.module_name == "solver";
    let filter: &dyn EventFilterFn = &solver_outputs;
    println!("Solver output records: {}", tracer.count_events(None, None, Some(filter)));

    Ok(())
}
