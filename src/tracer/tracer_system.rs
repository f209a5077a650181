//! In-memory recorder for trace events
//!
//! This module provides the central system for recording, filtering, and querying
//! trace events. It turns the dispatcher's call records into [`TraceEvent`]s and
//! keeps them in an [`EventStore`].

use super::event_store::EventStore;
use super::recorder::{CallRecord, Recorder};
use super::tracer_events::{EventFilterFn, Phase, TraceEvent};
use crate::wrapper::registry::FunctionRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Central system for capturing and querying trace events
pub struct TracerSystem {
    event_store: Arc<EventStore>,
    enabled: AtomicBool,
    registry: Option<Arc<FunctionRegistry>>,
}

impl TracerSystem {
    /// Create a new tracer system
    ///
    /// # Arguments
    ///
    /// * `event_store` - Optional event store to use. If None, a new one will be created.
    /// * `enabled` - Whether the tracer system is enabled (default: true)
    pub fn new(event_store: Option<Arc<EventStore>>, enabled: bool) -> Self {
        Self {
            event_store: event_store.unwrap_or_else(|| Arc::new(EventStore::default())),
            enabled: AtomicBool::new(enabled),
            registry: None,
        }
    }

    /// Resolve identity tokens of recorded functions through `registry`
    pub fn with_registry(mut self, registry: Arc<FunctionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Check if the tracer is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Enable the tracer system
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Disable the tracer system
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn record(&self, phase: Phase, record: CallRecord) {
        if !self.is_enabled() {
            return;
        }

        let function_id = self
            .registry
            .as_ref()
            .and_then(|registry| registry.identify(&record.function))
            .map(|id| id.to_string());

        self.event_store.store(TraceEvent {
            timestamp: current_timestamp(),
            time: record.time,
            phase,
            module_name: record.module_name,
            function_name: record.function_name,
            function_id,
            args: record.args,
            backtrace: record.backtrace.to_vec(),
        });
    }

    /// Get events from the store, optionally filtered
    pub fn get_events(
        &self,
        start_time: Option<u64>,
        end_time: Option<u64>,
        filter_func: Option<&dyn EventFilterFn>,
    ) -> Vec<TraceEvent> {
        self.event_store.get_events(start_time, end_time, filter_func)
    }

    /// Get event summaries from the store, optionally filtered
    ///
    /// # Arguments
    ///
    /// * `start_time` - Include events with sequence time >= start_time
    /// * `end_time` - Include events with sequence time <= end_time
    /// * `filter_func` - Custom filter function to apply to events
    pub fn get_event_summaries(
        &self,
        start_time: Option<u64>,
        end_time: Option<u64>,
        filter_func: Option<&dyn EventFilterFn>,
    ) -> Vec<String> {
        self.event_store.get_event_summaries(start_time, end_time, filter_func)
    }

    /// Get the last N event summaries, optionally filtered
    pub fn get_last_n_summaries(&self, n: usize, filter_func: Option<&dyn EventFilterFn>) -> Vec<String> {
        self.event_store.get_last_n_summaries(n, filter_func)
    }

    /// Count events matching filters
    pub fn count_events(
        &self,
        start_time: Option<u64>,
        end_time: Option<u64>,
        filter_func: Option<&dyn EventFilterFn>,
    ) -> usize {
        self.event_store.count_events(start_time, end_time, filter_func)
    }

    /// The inputs and outputs events of the call recorded at `time`
    pub fn call_pair(&self, time: u64) -> (Option<TraceEvent>, Option<TraceEvent>) {
        self.event_store.call_pair(time)
    }

    /// Clear all events from the event store
    pub fn clear(&self) {
        self.event_store.clear();
    }

    /// Get the total number of events in the store
    pub fn len(&self) -> usize {
        self.event_store.len()
    }

    /// Check if the event store is empty
    pub fn is_empty(&self) -> bool {
        self.event_store.is_empty()
    }
}

impl Recorder for TracerSystem {
    fn inputs(&self, record: CallRecord) {
        self.record(Phase::Inputs, record);
    }

    fn outputs(&self, record: CallRecord) {
        self.record(Phase::Outputs, record);
    }
}

impl Default for TracerSystem {
    fn default() -> Self {
        Self::new(None, true)
    }
}

/// Get current timestamp as Unix timestamp (seconds since epoch)
fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
