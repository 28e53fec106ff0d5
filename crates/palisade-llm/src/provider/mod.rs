//! Provider adapter trait and implementations
//!
//! Adapters are the only component that talks to the network. They receive
//! content that has already been redacted; nothing before the adapter
//! boundary may leave the process.

pub mod anthropic;
pub mod openai;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::types::Message;

/// Outbound request after redaction, ready to leave the process
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// Model identifier to send upstream
    pub model: String,
    /// Redacted conversation
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Raw provider result before validation and accounting
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Generated text
    pub text: String,
    /// Model reported by the provider
    pub model: String,
    /// Total tokens consumed
    pub tokens_used: u32,
    /// Actual cost of the call in cents
    pub cost_cents: u64,
}

/// Capability implemented by each upstream provider backend
///
/// New providers plug in by implementing this trait; the router stays
/// adapter-agnostic.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider name as configured
    fn name(&self) -> &str;

    /// Send one completion request upstream
    async fn invoke(&self, request: &OutboundRequest) -> Result<RawResponse, AdapterError>;
}

/// Convert token usage to cents at the configured per-1k rate, rounding up
///
/// Used when the wire protocol reports usage but not cost.
pub(crate) fn cost_from_usage(tokens_used: u32, rate_per_1k_cents: u64) -> u64 {
    (u64::from(tokens_used) * rate_per_1k_cents).div_ceil(1000)
}

/// Map a transport-level failure to an adapter error
pub(crate) fn classify_transport_error(error: &reqwest::Error) -> AdapterError {
    if error.is_timeout() {
        AdapterError::Timeout
    } else {
        AdapterError::Network(error.to_string())
    }
}

/// Map a non-success HTTP status to an adapter error
pub(crate) fn classify_status(status: reqwest::StatusCode) -> AdapterError {
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => AdapterError::Auth,
        reqwest::StatusCode::TOO_MANY_REQUESTS => AdapterError::RateLimited,
        other => AdapterError::Upstream {
            status: other.as_u16(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_rounds_up_to_the_next_cent() {
        assert_eq!(cost_from_usage(0, 3), 0);
        assert_eq!(cost_from_usage(1, 3), 1);
        assert_eq!(cost_from_usage(1000, 3), 3);
        assert_eq!(cost_from_usage(1001, 3), 4);
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(reqwest::StatusCode::UNAUTHORIZED),
            AdapterError::Auth
        ));
        assert!(matches!(
            classify_status(reqwest::StatusCode::TOO_MANY_REQUESTS),
            AdapterError::RateLimited
        ));
        assert!(matches!(
            classify_status(reqwest::StatusCode::BAD_GATEWAY),
            AdapterError::Upstream { status: 502 }
        ));
    }
}
