//! Event storage with callbacks and filtering
//!
//! This module provides thread-safe event storage with support for callbacks,
//! filtering by sequence time range, and custom predicates.

use super::tracer_events::{EventFilterFn, Phase, TraceEvent};
use std::sync::{Arc, Mutex, MutexGuard};

/// Type alias for event callback functions
pub type EventCallback = Arc<dyn Fn(&TraceEvent) + Send + Sync>;

/// Store for capturing and querying trace events
///
/// EventStore provides thread-safe storage for trace events with support for:
/// - Callbacks triggered on each stored event
/// - Filtering by sequence time range
/// - Custom filter predicates
/// - Query for last N events
/// - Lookup of the inputs/outputs pair of one call
pub struct EventStore {
    events: Mutex<Vec<TraceEvent>>,
    on_store_callback: Option<EventCallback>,
}

impl EventStore {
    /// Create a new event store
    ///
    /// # Arguments
    ///
    /// * `on_store_callback` - Optional callback function called whenever an event is stored
    pub fn new(on_store_callback: Option<EventCallback>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            on_store_callback,
        }
    }

    fn events(&self) -> MutexGuard<'_, Vec<TraceEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store an event in the event store
    ///
    /// If a callback is configured, it will be called with the stored event.
    pub fn store(&self, event: TraceEvent) {
        if let Some(callback) = &self.on_store_callback {
            callback(&event);
        }

        self.events().push(event);
    }

    /// Count events matching filters
    ///
    /// # Arguments
    ///
    /// * `start_time` - Include events with sequence time >= start_time
    /// * `end_time` - Include events with sequence time <= end_time
    /// * `filter_func` - Custom filter function to apply to events
    pub fn count_events(
        &self,
        start_time: Option<u64>,
        end_time: Option<u64>,
        filter_func: Option<&dyn EventFilterFn>,
    ) -> usize {
        self.events()
            .iter()
            .filter(|event| passes(event, start_time, end_time, filter_func))
            .count()
    }

    /// Get events matching filters
    ///
    /// # Arguments
    ///
    /// * `start_time` - Include events with sequence time >= start_time
    /// * `end_time` - Include events with sequence time <= end_time
    /// * `filter_func` - Custom filter function to apply to events
    pub fn get_events(
        &self,
        start_time: Option<u64>,
        end_time: Option<u64>,
        filter_func: Option<&dyn EventFilterFn>,
    ) -> Vec<TraceEvent> {
        self.events()
            .iter()
            .filter(|event| passes(event, start_time, end_time, filter_func))
            .cloned()
            .collect()
    }

    /// Get summaries of events matching filters
    pub fn get_event_summaries(
        &self,
        start_time: Option<u64>,
        end_time: Option<u64>,
        filter_func: Option<&dyn EventFilterFn>,
    ) -> Vec<String> {
        self.events()
            .iter()
            .filter(|event| passes(event, start_time, end_time, filter_func))
            .map(|event| event.printable_summary())
            .collect()
    }

    /// Get the last N event summaries, optionally filtered
    pub fn get_last_n_summaries(&self, n: usize, filter_func: Option<&dyn EventFilterFn>) -> Vec<String> {
        let events = self.events();

        let filtered: Vec<_> = events
            .iter()
            .filter(|event| passes(event, None, None, filter_func))
            .collect();

        let start_idx = filtered.len().saturating_sub(n);
        filtered[start_idx..].iter().map(|e| e.printable_summary()).collect()
    }

    /// The inputs and outputs events recorded for one call
    ///
    /// Either side is `None` if it has not been stored (yet).
    pub fn call_pair(&self, time: u64) -> (Option<TraceEvent>, Option<TraceEvent>) {
        let events = self.events();
        let find = |phase: Phase| {
            events
                .iter()
                .find(|event| event.time == time && event.phase == phase)
                .cloned()
        };
        (find(Phase::Inputs), find(Phase::Outputs))
    }

    /// Clear all events from the store
    pub fn clear(&self) {
        self.events().clear();
    }

    /// Get the total number of events in the store
    pub fn len(&self) -> usize {
        self.events().len()
    }

    /// Check if the event store is empty
    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(None)
    }
}

fn passes(
    event: &TraceEvent,
    start_time: Option<u64>,
    end_time: Option<u64>,
    filter_func: Option<&dyn EventFilterFn>,
) -> bool {
    if start_time.is_some_and(|start| event.time < start) {
        return false;
    }
    if end_time.is_some_and(|end| event.time > end) {
        return false;
    }
    filter_func.map_or(true, |filter| filter.matches(event))
}
