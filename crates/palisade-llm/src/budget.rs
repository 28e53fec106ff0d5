//! Per-provider spend tracking
//!
//! Budgets and spend are integer cents. The pre-call `can_afford` check is
//! an estimate gate; the post-call `debit` with the actual cost is the
//! authoritative charge.

use dashmap::DashMap;
use thiserror::Error;

/// Debit rejected because it would push spend past the provider's ceiling
#[derive(Debug, Error)]
#[error("debit of {attempted_cents} cents exceeds remaining budget of {remaining_cents} cents")]
pub struct BudgetExceeded {
    /// Cost that was refused
    pub attempted_cents: u64,
    /// Budget left at the time of the refusal
    pub remaining_cents: u64,
}

struct LedgerEntry {
    budget_cents: u64,
    spent_cents: u64,
}

/// Tracks spend against per-provider ceilings
///
/// The map's per-key write guard serializes concurrent debits against the
/// same provider, so the sum of accepted debits never exceeds the ceiling.
/// Unrelated providers are never serialized against each other.
pub struct BudgetLedger {
    entries: DashMap<String, LedgerEntry>,
}

impl Default for BudgetLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register a provider with its spend ceiling
    ///
    /// Re-registering a provider resets its accumulated spend.
    pub fn register(&self, provider: &str, budget_cents: u64) {
        self.entries.insert(
            provider.to_owned(),
            LedgerEntry {
                budget_cents,
                spent_cents: 0,
            },
        );
    }

    /// Whether the provider can absorb an estimated cost
    ///
    /// Unknown providers can afford nothing.
    pub fn can_afford(&self, provider: &str, estimated_cost_cents: u64) -> bool {
        self.entries
            .get(provider)
            .is_some_and(|e| e.spent_cents.saturating_add(estimated_cost_cents) <= e.budget_cents)
    }

    /// Charge the actual cost of a confirmed call
    ///
    /// Rejects, rather than clamps, a debit that would exceed the ceiling.
    /// A rejection is a hard stop for this provider for this request; the
    /// caller advances to the next candidate instead of retrying here.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetExceeded`] when the debit would overrun the budget
    /// or the provider is unknown
    pub fn debit(&self, provider: &str, actual_cost_cents: u64) -> Result<(), BudgetExceeded> {
        let Some(mut entry) = self.entries.get_mut(provider) else {
            return Err(BudgetExceeded {
                attempted_cents: actual_cost_cents,
                remaining_cents: 0,
            });
        };

        let remaining = entry.budget_cents.saturating_sub(entry.spent_cents);
        if actual_cost_cents > remaining {
            return Err(BudgetExceeded {
                attempted_cents: actual_cost_cents,
                remaining_cents: remaining,
            });
        }

        entry.spent_cents += actual_cost_cents;
        Ok(())
    }

    /// Budget left for a provider, floored at zero
    pub fn remaining(&self, provider: &str) -> u64 {
        self.entries
            .get(provider)
            .map_or(0, |e| e.budget_cents.saturating_sub(e.spent_cents))
    }

    /// Accumulated spend for a provider
    pub fn spent(&self, provider: &str) -> u64 {
        self.entries.get(provider).map_or(0, |e| e.spent_cents)
    }

    /// Zero the accumulated spend for every provider
    pub fn reset(&self) {
        for mut entry in self.entries.iter_mut() {
            entry.spent_cents = 0;
        }
    }
}
