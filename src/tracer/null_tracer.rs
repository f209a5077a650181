//! Null recorder following the Null Object Pattern
//!
//! [`NullRecorder`] accepts every record and keeps nothing, so a dispatcher can be
//! wired up without a real recorder.

use super::recorder::{CallRecord, Recorder};

/// A recorder that silently discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl NullRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl Recorder for NullRecorder {
    fn inputs(&self, _record: CallRecord) {}

    fn outputs(&self, _record: CallRecord) {}
}
