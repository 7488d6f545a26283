//! Engine Configuration
//!
//! Knobs a host may set when embedding the engine, loadable from TOML:
//!
//! ```toml
//! call_policy = "flat-overload-set"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a call through the seed reaches the selected declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallPolicy {
    /// The seed forwards its arguments to the selected declaration and
    /// converts the result to the seed's return type.
    #[default]
    Forwarding,
    /// The tree behaves as one argument-compatible overload set: the
    /// selected declaration is called directly and no seed-level return
    /// conversion is applied.
    FlatOverloadSet,
}

/// Configuration for the resolution engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Call model for seed invocations.
    pub call_policy: CallPolicy,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineConfig {
    /// Parse a configuration from TOML source. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn with_call_policy(mut self, call_policy: CallPolicy) -> Self {
        self.call_policy = call_policy;
        self
    }
}
