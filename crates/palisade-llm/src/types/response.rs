use serde::{Deserialize, Serialize};

/// Successful generation result; ownership transfers to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,
    /// Model that produced the text
    pub model: String,
    /// Total tokens consumed by the call
    pub tokens_used: u32,
    /// Actual cost debited from the provider's budget
    pub cost_cents: u64,
    /// Provider that served the request
    pub provider: String,
}
