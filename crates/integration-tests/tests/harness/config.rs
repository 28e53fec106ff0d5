//! Programmatic configuration builder for integration tests

use indexmap::IndexMap;
use palisade_config::{
    CircuitBreakerConfig, LoggingConfig, ProviderConfig, ProviderKind, RedactionConfig, RouterConfig,
};

/// Builder for constructing router configurations against mock backends
pub struct ConfigBuilder {
    config: RouterConfig,
    next_priority: u32,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: RouterConfig {
                enabled: true,
                providers: IndexMap::new(),
                circuit_breaker: CircuitBreakerConfig {
                    failure_threshold: 5,
                    reset_timeout_ms: 30_000,
                },
                pii_redaction: RedactionConfig::default(),
                logging: LoggingConfig::default(),
            },
            next_priority: 1,
        }
    }

    /// Add an OpenAI-compatible provider pointed at a mock backend
    ///
    /// Providers are assigned ascending priorities in insertion order, so
    /// the first added is tried first.
    pub fn with_openai_provider(mut self, name: &str, base_url: &str) -> Self {
        let priority = self.next_priority;
        self.next_priority += 1;

        self.config.providers.insert(
            name.to_owned(),
            ProviderConfig {
                kind: ProviderKind::Openai,
                enabled: true,
                api_key: None,
                base_url: Some(base_url.parse().expect("valid URL")),
                models: vec!["mock-model-1".to_owned()],
                budget_cents: 10_000,
                priority,
                retry_attempts: 0,
                cost_per_1k_tokens_cents: 3,
                request_timeout_ms: 2_000,
            },
        );
        self
    }

    /// Disable the router entirely
    pub fn disabled(mut self) -> Self {
        self.config.enabled = false;
        self
    }

    /// Override the circuit breaker failure threshold
    pub fn with_failure_threshold(mut self, failure_threshold: u32) -> Self {
        self.config.circuit_breaker.failure_threshold = failure_threshold;
        self
    }

    /// Override a provider's budget ceiling
    ///
    /// # Panics
    ///
    /// Panics if the provider has not been added yet
    pub fn with_budget(mut self, name: &str, budget_cents: u64) -> Self {
        self.config
            .providers
            .get_mut(name)
            .expect("provider must be added before overriding its budget")
            .budget_cents = budget_cents;
        self
    }

    /// Override a provider's retry count
    ///
    /// # Panics
    ///
    /// Panics if the provider has not been added yet
    pub fn with_retry_attempts(mut self, name: &str, retry_attempts: u32) -> Self {
        self.config
            .providers
            .get_mut(name)
            .expect("provider must be added before overriding its retries")
            .retry_attempts = retry_attempts;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> RouterConfig {
        self.config
    }
}
