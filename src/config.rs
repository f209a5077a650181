//! Tracer configuration

use crate::error::{Result, TracerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for call interception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Whether intercepted calls are traced at all; when false calls pass straight through
    pub enabled: bool,
    /// Capture the caller's stack for every intercepted call
    pub capture_backtrace: bool,
    /// Maximum number of frames kept per backtrace
    pub max_backtrace_depth: usize,
    /// Re-cast vectorized primitive results to the type resolved from their type table
    pub retype_vectorized_outputs: bool,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capture_backtrace: true,
            max_backtrace_depth: 64,
            retype_vectorized_outputs: true,
        }
    }
}

impl TracerConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capture_backtrace && self.max_backtrace_depth == 0 {
            return Err(TracerError::ConfigError(
                "max_backtrace_depth must be positive when capture_backtrace is set".to_string(),
            ));
        }
        Ok(())
    }
}
