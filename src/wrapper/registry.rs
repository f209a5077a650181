//! Registry of instrumented functions
//!
//! Installing instrumentation registers each target under an opaque identity token.
//! Dispatch variants that receive a token resolve the live callable here, and the
//! registry remembers which callables are themselves instrumentation wrappers so
//! that double instrumentation can be reported.

use crate::callable::Callable;
use crate::error::{Result, TracerError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Opaque identity token of a registered callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId(Uuid);

impl FunctionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FunctionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity token plus the module and display name declared at registration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub id: FunctionId,
    pub module: String,
    pub name: String,
}

/// Resolves identity tokens to live callables
pub trait IdentityCache: Send + Sync {
    /// Look up the callable registered under `id`
    fn lookup(&self, id: &FunctionId) -> Result<Arc<dyn Callable>>;

    /// Whether `callable` is itself an instrumentation wrapper
    fn is_instrumented(&self, _callable: &Arc<dyn Callable>) -> bool {
        false
    }
}

struct Entry {
    callable: Arc<dyn Callable>,
    info: FunctionInfo,
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<FunctionId, Entry>,
    by_address: HashMap<usize, FunctionId>,
    instrumented: HashSet<FunctionId>,
}

/// Thread-safe table of registered callables
#[derive(Default)]
pub struct FunctionRegistry {
    state: RwLock<RegistryState>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callable under a fresh identity token
    ///
    /// Registering the same callable object again returns its existing token.
    pub fn register(
        &self,
        callable: Arc<dyn Callable>,
        module: impl Into<String>,
        name: impl Into<String>,
    ) -> FunctionInfo {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let address = address_of(&callable);

        if let Some(id) = state.by_address.get(&address) {
            if let Some(entry) = state.entries.get(id) {
                return entry.info.clone();
            }
        }

        let info = FunctionInfo {
            id: FunctionId::new(),
            module: module.into(),
            name: name.into(),
        };
        state.by_address.insert(address, info.id);
        state.entries.insert(
            info.id,
            Entry {
                callable,
                info: info.clone(),
            },
        );
        info
    }

    /// Registration info for a token
    pub fn info(&self, id: &FunctionId) -> Option<FunctionInfo> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.entries.get(id).map(|entry| entry.info.clone())
    }

    /// Token of an already registered callable object
    pub fn identify(&self, callable: &Arc<dyn Callable>) -> Option<FunctionId> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.by_address.get(&address_of(callable)).copied()
    }

    /// Record that the callable registered under `id` is an instrumentation wrapper
    ///
    /// Returns `false` if it was already marked.
    pub fn mark_instrumented(&self, id: FunctionId) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.instrumented.insert(id)
    }

    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityCache for FunctionRegistry {
    fn lookup(&self, id: &FunctionId) -> Result<Arc<dyn Callable>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state
            .entries
            .get(id)
            .map(|entry| Arc::clone(&entry.callable))
            .ok_or_else(|| TracerError::LookupError(id.to_string()))
    }

    fn is_instrumented(&self, callable: &Arc<dyn Callable>) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state
            .by_address
            .get(&address_of(callable))
            .is_some_and(|id| state.instrumented.contains(id))
    }
}

/// Object identity of a shared callable
fn address_of(callable: &Arc<dyn Callable>) -> usize {
    Arc::as_ptr(callable) as *const () as usize
}
