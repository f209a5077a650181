//! Call-site backtraces attached to trace records

use serde::{Deserialize, Serialize};

/// One resolved stack frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Demangled symbol name, or `<unknown>` when it cannot be resolved
    pub name: String,
    pub filename: Option<String>,
    pub lineno: Option<u32>,
}

/// Source of the stack captured once per intercepted call
pub trait BacktraceProvider: Send + Sync {
    fn backtrace(&self) -> Vec<Frame>;
}

/// Captures the live stack of the calling thread
#[derive(Debug, Clone)]
pub struct StackBacktrace {
    max_depth: usize,
}

/// Frames from the tracer and the unwinder themselves are not part of the caller's stack
const INTERNAL_PREFIXES: [&str; 2] = ["backtrace::", "calltracer::wrapper::"];

impl StackBacktrace {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for StackBacktrace {
    fn default() -> Self {
        Self::new(64)
    }
}

impl BacktraceProvider for StackBacktrace {
    fn backtrace(&self) -> Vec<Frame> {
        let mut frames = Vec::with_capacity(16);

        backtrace::trace(|raw| {
            backtrace::resolve_frame(raw, |symbol| {
                let name = symbol
                    .name()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());

                let bare = name.trim_start_matches('<');
                if INTERNAL_PREFIXES.iter().any(|prefix| bare.starts_with(prefix)) {
                    return;
                }

                frames.push(Frame {
                    name,
                    filename: symbol.filename().map(|p| p.display().to_string()),
                    lineno: symbol.lineno(),
                });
            });
            frames.len() < self.max_depth
        });

        frames.truncate(self.max_depth);
        frames
    }
}

/// Provider used when backtrace capture is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBacktrace;

impl BacktraceProvider for NoBacktrace {
    fn backtrace(&self) -> Vec<Frame> {
        Vec::new()
    }
}
