use serde::Deserialize;

/// Circuit breaker thresholds, shared by every provider's breaker
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before a provider's circuit opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// How long an open circuit blocks requests before a trial is allowed
    #[serde(default = "default_reset_timeout_ms")]
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            reset_timeout_ms: default_reset_timeout_ms(),
        }
    }
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_reset_timeout_ms() -> u64 {
    30_000
}
