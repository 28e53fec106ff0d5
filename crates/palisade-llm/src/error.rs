use thiserror::Error;

use crate::schema::SchemaMismatch;

/// Errors surfaced to callers of the router
///
/// Per-candidate failures (circuit open, budget exhausted, adapter errors,
/// schema mismatches) are recovered locally by advancing to the next
/// candidate; only the kinds below ever reach the caller.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Router configuration has `enabled = false`; no provider was contacted
    #[error("llm router is disabled")]
    Disabled,

    /// No configured provider matches the request's model and enabled filters
    #[error("no eligible provider for request")]
    NoEligibleProvider,

    /// The request itself is malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Every eligible candidate was tried or skipped without success
    #[error("all providers failed after {} candidates", .attempts.len())]
    AllProvidersFailed {
        /// Per-provider outcome, in the order candidates were considered
        attempts: Vec<ProviderAttempt>,
    },
}

/// Outcome of one candidate during fallback, kept for diagnosis
#[derive(Debug)]
pub struct ProviderAttempt {
    /// Provider name as configured
    pub provider: String,
    /// Why this candidate did not produce a response
    pub failure: ProviderFailure,
}

/// Why a single candidate did not produce a response
#[derive(Debug, Error)]
pub enum ProviderFailure {
    /// Skipped: the provider's circuit breaker is open
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// Skipped: the provider cannot afford the request, or a post-call
    /// debit was rejected
    #[error("budget exhausted")]
    BudgetExhausted,

    /// The provider responded but the payload violated the requested schema
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),

    /// The underlying provider call failed after exhausting inner retries
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// Failure from the underlying provider call
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The invocation exceeded the configured request timeout
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Provider rejected the credentials
    #[error("authentication rejected by provider")]
    Auth,

    /// Provider rate limit hit
    #[error("rate limited by provider")]
    RateLimited,

    /// Provider returned a non-success status
    #[error("upstream error: status {status}")]
    Upstream {
        /// HTTP status code
        status: u16,
    },

    /// Provider returned a payload the adapter could not interpret
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
}

impl AdapterError {
    /// Whether an inner retry against the same provider may help
    ///
    /// Auth failures and malformed payloads are deterministic; retrying
    /// them only burns the budget estimate window.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Network(_) | Self::RateLimited | Self::Upstream { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(AdapterError::Timeout.is_transient());
        assert!(AdapterError::RateLimited.is_transient());
        assert!(AdapterError::Upstream { status: 503 }.is_transient());
        assert!(!AdapterError::Auth.is_transient());
        assert!(!AdapterError::InvalidResponse("bad json".to_owned()).is_transient());
    }

    #[test]
    fn aggregate_error_reports_candidate_count() {
        let err = RouterError::AllProvidersFailed {
            attempts: vec![
                ProviderAttempt {
                    provider: "openai".to_owned(),
                    failure: ProviderFailure::CircuitOpen,
                },
                ProviderAttempt {
                    provider: "anthropic".to_owned(),
                    failure: ProviderFailure::Adapter(AdapterError::Timeout),
                },
            ],
        };
        assert_eq!(err.to_string(), "all providers failed after 2 candidates");
    }
}
