//! Read-only provider health and budget snapshots
//!
//! Used by monitoring dashboards and tests. Taking a snapshot never mutates
//! ledger or breaker state; the breaker's lazy half-open transition is
//! observed through a non-committing read.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::breaker::{CircuitBreaker, CircuitState};
use crate::budget::BudgetLedger;
use crate::registry::ProviderRegistry;

/// Snapshot of one provider's governance state
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStats {
    /// Whether the provider may be selected at all
    pub enabled: bool,
    /// Derived: enabled, circuit not open, and budget not exhausted
    pub healthy: bool,
    /// Budget position
    pub budget: BudgetStats,
    /// Circuit breaker position
    pub circuit_breaker: CircuitStats,
    /// Models the provider serves
    pub supported_models: Vec<String>,
}

/// Budget position for one provider
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStats {
    /// Cents left before the ceiling
    pub remaining_cents: u64,
    /// Cents spent so far
    pub spent_cents: u64,
}

/// Circuit breaker position for one provider
#[derive(Debug, Clone, Serialize)]
pub struct CircuitStats {
    /// Current state
    pub status: CircuitState,
    /// Failures since the last success or reset
    pub failure_count: u32,
}

/// Aggregate live component state into a serializable snapshot
pub(crate) fn snapshot(
    registry: &ProviderRegistry,
    ledger: &BudgetLedger,
    breaker: &CircuitBreaker,
) -> BTreeMap<String, ProviderStats> {
    registry
        .iter()
        .map(|(name, config)| {
            let status = breaker.peek(name);
            let remaining_cents = ledger.remaining(name);

            let stats = ProviderStats {
                enabled: config.enabled,
                healthy: config.enabled && status != CircuitState::Open && remaining_cents > 0,
                budget: BudgetStats {
                    remaining_cents,
                    spent_cents: ledger.spent(name),
                },
                circuit_breaker: CircuitStats {
                    status,
                    failure_count: breaker.failure_count(name),
                },
                supported_models: config.models.clone(),
            };

            (name.to_owned(), stats)
        })
        .collect()
}
