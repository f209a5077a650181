//! Recorders for intercepted calls
//!
//! The dispatcher emits two [`CallRecord`]s per intercepted call to a [`Recorder`]:
//! one before the original callable runs and one after it returns. This module
//! defines that interface and the recorders shipped with the crate.
//!
//! # Architecture
//!
//! - **Recorder**: the fire-and-forget interface the dispatcher emits to
//! - **TraceEvent**: a serializable, timestamped view of one record
//! - **EventStore**: thread-safe storage for events with callbacks and filtering
//! - **TracerSystem**: in-memory recorder that can be enabled and disabled at runtime
//! - **NullRecorder**: null object pattern for when recording is not wanted
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use calltracer::tracer::TracerSystem;
//! use std::sync::Arc;
//!
//! let tracer = Arc::new(TracerSystem::default());
//! // ... hand `tracer` to a Dispatcher and make some calls ...
//!
//! for summary in tracer.get_last_n_summaries(10, None) {
//!     println!("{}", summary);
//! }
//! ```

pub mod event_store;
pub mod null_tracer;
pub mod recorder;
pub mod tracer_events;
pub mod tracer_system;

pub use event_store::{EventCallback, EventStore};
pub use null_tracer::NullRecorder;
pub use recorder::{CallRecord, Recorder};
pub use tracer_events::{EventFilterFn, Phase, TraceEvent};
pub use tracer_system::TracerSystem;
