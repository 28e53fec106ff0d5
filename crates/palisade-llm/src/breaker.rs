//! Per-provider circuit breakers
//!
//! Keeps requests away from providers that are consistently failing,
//! allowing them time to recover. The Open -> HalfOpen transition is lazy:
//! it is a function of elapsed time evaluated on the next state query, so
//! no background timer is needed.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use palisade_config::CircuitBreakerConfig;
use serde::Serialize;

/// Circuit breaker state for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, requests flow through and failures are counted
    Closed,
    /// Provider is failing, requests are blocked
    Open,
    /// Probing: a trial request is allowed to test recovery
    HalfOpen,
}

struct BreakerEntry {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
}

impl BreakerEntry {
    const fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            opened_at: None,
        }
    }
}

/// Tracks failure state per provider
///
/// Updates go through the map's per-key write guard, so concurrent
/// failures against one provider are counted without lost updates while
/// unrelated providers proceed independently.
pub struct CircuitBreaker {
    providers: DashMap<String, BreakerEntry>,
    failure_threshold: u32,
    reset_timeout: Duration,
}

impl CircuitBreaker {
    /// Create a breaker set from configuration; every provider starts Closed
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        Self {
            providers: DashMap::new(),
            failure_threshold: config.failure_threshold,
            reset_timeout: Duration::from_millis(config.reset_timeout_ms),
        }
    }

    /// Current state for a provider, committing the lazy Open -> HalfOpen
    /// transition once the reset timeout has elapsed
    pub fn state(&self, provider: &str) -> CircuitState {
        let Some(mut entry) = self.providers.get_mut(provider) else {
            return CircuitState::Closed;
        };

        if entry.state == CircuitState::Open
            && entry.opened_at.is_some_and(|t| t.elapsed() >= self.reset_timeout)
        {
            tracing::debug!(provider, "circuit breaker half-open, allowing trial request");
            entry.state = CircuitState::HalfOpen;
        }

        entry.state
    }

    /// Whether requests to the provider are currently blocked
    pub fn is_open(&self, provider: &str) -> bool {
        self.state(provider) == CircuitState::Open
    }

    /// Read the state without committing the half-open transition
    ///
    /// Used by the stats snapshot, which must observe but never trigger
    /// state changes.
    pub fn peek(&self, provider: &str) -> CircuitState {
        let Some(entry) = self.providers.get(provider) else {
            return CircuitState::Closed;
        };

        if entry.state == CircuitState::Open
            && entry.opened_at.is_some_and(|t| t.elapsed() >= self.reset_timeout)
        {
            return CircuitState::HalfOpen;
        }

        entry.state
    }

    /// Failures recorded since the last success or reset
    pub fn failure_count(&self, provider: &str) -> u32 {
        self.providers.get(provider).map_or(0, |e| e.failure_count)
    }

    /// Record a successful request, closing the circuit
    ///
    /// In Closed state this resets the failure count to zero; a HalfOpen
    /// trial success closes the circuit the same way.
    pub fn record_success(&self, provider: &str) {
        let mut entry = self.entry(provider);
        entry.state = CircuitState::Closed;
        entry.failure_count = 0;
        entry.opened_at = None;
    }

    /// Record a failed request
    ///
    /// Opens the circuit once the threshold is reached; a HalfOpen trial
    /// failure re-opens it with a fresh recovery timer.
    pub fn record_failure(&self, provider: &str) {
        let mut entry = self.entry(provider);

        match entry.state {
            CircuitState::Closed => {
                entry.failure_count += 1;
                if entry.failure_count >= self.failure_threshold {
                    entry.state = CircuitState::Open;
                    entry.opened_at = Some(Instant::now());
                    let failure_count = entry.failure_count;
                    drop(entry);
                    tracing::warn!(provider, failure_count, "circuit breaker opened for provider");
                }
            }
            CircuitState::HalfOpen => {
                entry.failure_count += 1;
                entry.state = CircuitState::Open;
                entry.opened_at = Some(Instant::now());
                drop(entry);
                tracing::warn!(provider, "trial request failed, circuit breaker re-opened");
            }
            // Failures recorded while already Open keep the existing timer
            CircuitState::Open => {
                entry.failure_count += 1;
            }
        }
    }

    /// Return every provider to Closed with zeroed counters
    pub fn reset(&self) {
        self.providers.clear();
    }

    fn entry(&self, provider: &str) -> dashmap::mapref::one::RefMut<'_, String, BreakerEntry> {
        self.providers
            .entry(provider.to_owned())
            .or_insert_with(BreakerEntry::new)
    }

    /// Backdate an open circuit so tests can exercise the recovery path
    /// without sleeping.
    #[cfg(test)]
    fn force_elapsed(&self, provider: &str) {
        if let Some(mut entry) = self.providers.get_mut(provider) {
            entry.opened_at = Some(Instant::now() - self.reset_timeout - Duration::from_millis(1));
        }
    }
}
