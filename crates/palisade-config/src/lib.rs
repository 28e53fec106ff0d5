//! Configuration for the palisade LLM router
//!
//! Loaded once at process start (or test setup) and never mutated during
//! operation. Hot reload is deliberately unsupported.

#![allow(clippy::must_use_candidate)]

pub mod breaker;
mod env;
mod loader;
pub mod logging;
pub mod provider;
pub mod redaction;

use indexmap::IndexMap;
use serde::Deserialize;

pub use breaker::CircuitBreakerConfig;
pub use logging::LoggingConfig;
pub use provider::{ProviderConfig, ProviderKind};
pub use redaction::{BUILTIN_PATTERNS, RedactionConfig};

/// Top-level router configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Master switch; when false every generation call is rejected
    #[serde(default = "crate::default_true")]
    pub enabled: bool,
    /// Provider configurations keyed by name
    ///
    /// Insertion order is preserved and breaks priority ties during
    /// candidate selection.
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
    /// Circuit breaker thresholds shared by all providers
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
    /// PII redaction applied before content leaves the process
    #[serde(default)]
    pub pii_redaction: RedactionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            providers: IndexMap::new(),
            circuit_breaker: CircuitBreakerConfig::default(),
            pii_redaction: RedactionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub(crate) const fn default_true() -> bool {
    true
}
