//! Governed routing over multiple LLM providers
//!
//! Selects a provider for each generation request under budget,
//! circuit-breaker, priority, and model-support constraints, redacts PII
//! before any content leaves the process, and falls back deterministically
//! across providers on failure.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod breaker;
pub mod budget;
pub mod error;
pub mod provider;
pub mod redact;
pub mod registry;
pub mod router;
pub mod schema;
pub mod stats;
pub mod types;

pub use breaker::{CircuitBreaker, CircuitState};
pub use budget::{BudgetExceeded, BudgetLedger};
pub use error::{AdapterError, ProviderAttempt, ProviderFailure, RouterError};
pub use provider::{OutboundRequest, ProviderAdapter, RawResponse};
pub use redact::Redactor;
pub use registry::ProviderRegistry;
pub use router::Router;
pub use schema::SchemaMismatch;
pub use stats::{BudgetStats, CircuitStats, ProviderStats};
pub use types::{GenerationRequest, GenerationResponse, Message, Role};
