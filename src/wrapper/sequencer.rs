//! Event sequencing
//!
//! Every intercepted call takes one time index from an [`EventSequencer`]; its
//! inputs and outputs records share that index.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing event counter
///
/// Safe to share between threads: concurrent calls never receive the same index.
#[derive(Debug, Default)]
pub struct EventSequencer {
    next: AtomicU64,
}

impl EventSequencer {
    /// Create a sequencer whose first index is 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next time index
    pub fn next_event(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Index the next call will receive
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}
