//! Trace events recorded for intercepted calls
//!
//! Each intercepted call produces two events sharing one sequence time: an
//! [`Phase::Inputs`] event with the bound arguments and an [`Phase::Outputs`]
//! event with the normalized return value.

use crate::value::ValueMap;
use crate::wrapper::backtrace::Frame;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for filtering trace events
///
/// Implement this trait to create custom event filters. This trait is used
/// instead of raw closure types to avoid type complexity warnings.
pub trait EventFilterFn: Send + Sync {
    /// Test whether an event passes the filter
    fn matches(&self, event: &TraceEvent) -> bool;
}

impl<F> EventFilterFn for F
where
    F: Fn(&TraceEvent) -> bool + Send + Sync,
{
    fn matches(&self, event: &TraceEvent) -> bool {
        self(event)
    }
}

/// Which side of a call an event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Inputs,
    Outputs,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Inputs => f.write_str("inputs"),
            Phase::Outputs => f.write_str("outputs"),
        }
    }
}

/// One recorded side of an intercepted call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Wall-clock time the event was recorded (Unix timestamp)
    pub timestamp: f64,
    /// Sequence time shared by the inputs and outputs of one call
    pub time: u64,
    pub phase: Phase,
    pub module_name: String,
    pub function_name: String,
    /// Identity token of the callable, when it is registered
    pub function_id: Option<String>,
    /// Bound arguments for inputs, normalized return value for outputs
    pub args: ValueMap,
    pub backtrace: Vec<Frame>,
}

impl TraceEvent {
    /// Get a formatted string summary of the event
    pub fn printable_summary(&self) -> String {
        let secs = self.timestamp.trunc() as i64;
        let nanos = (self.timestamp.fract() * 1e9) as u32;
        let dt = DateTime::from_timestamp(secs, nanos)
            .unwrap_or_default()
            .with_timezone(&Local);
        let time_str = dt.format("%H:%M:%S%.3f").to_string();

        let mut summary = format!(
            "[{}] #{} {} {}.{}",
            time_str, self.time, self.phase, self.module_name, self.function_name
        );

        if !self.args.is_empty() {
            let mut names: Vec<&String> = self.args.keys().collect();
            names.sort();
            let names: Vec<&str> = names.into_iter().map(|s| s.as_str()).collect();
            summary.push_str(&format!("\n   Values: {}", names.join(", ")));
        }

        if let Some(frame) = self.backtrace.first() {
            summary.push_str(&format!("\n   Called from: {}", frame.name));
            if let (Some(file), Some(line)) = (&frame.filename, frame.lineno) {
                summary.push_str(&format!(" ({}:{})", file, line));
            }
        }

        summary
    }
}
