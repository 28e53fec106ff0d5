//! Governed provider routing
//!
//! For each generation request the router walks the deterministic candidate
//! list, consulting the circuit breaker and budget ledger before any call
//! leaves the process, and falls back to the next candidate on failure.
//! Skipped providers are never mutated; debits happen only after a
//! confirmed success.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use palisade_config::{ProviderConfig, ProviderKind, RouterConfig};

use crate::breaker::{CircuitBreaker, CircuitState};
use crate::budget::BudgetLedger;
use crate::error::{AdapterError, ProviderAttempt, ProviderFailure, RouterError};
use crate::provider::anthropic::AnthropicAdapter;
use crate::provider::openai::OpenAiAdapter;
use crate::provider::{OutboundRequest, ProviderAdapter, RawResponse};
use crate::redact::Redactor;
use crate::registry::ProviderRegistry;
use crate::schema::{self, SchemaMismatch};
use crate::stats::{self, ProviderStats};
use crate::types::{GenerationRequest, GenerationResponse, Message};

/// Output allowance assumed by the affordability estimate when the caller
/// does not bound the response
const ESTIMATE_OUTPUT_TOKENS: u32 = 1024;

/// Governed router over the configured providers
///
/// Constructed once at process start and passed by reference to consumers.
/// All runtime state lives behind `&self`; concurrent callers share one
/// router.
pub struct Router {
    enabled: bool,
    registry: ProviderRegistry,
    redactor: Redactor,
    ledger: BudgetLedger,
    breaker: CircuitBreaker,
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    sanitize_logs: bool,
}

impl Router {
    /// Build a router from configuration, constructing one HTTP adapter per
    /// provider
    ///
    /// # Errors
    ///
    /// Returns an error if a redaction pattern does not compile
    pub fn from_config(config: &RouterConfig) -> anyhow::Result<Self> {
        let adapters = config
            .providers
            .iter()
            .map(|(name, provider_config)| {
                let adapter: Arc<dyn ProviderAdapter> = match provider_config.kind {
                    ProviderKind::Openai => Arc::new(OpenAiAdapter::new(name.clone(), provider_config)),
                    ProviderKind::Anthropic => {
                        Arc::new(AnthropicAdapter::new(name.clone(), provider_config))
                    }
                };
                (name.clone(), adapter)
            })
            .collect();

        Self::with_adapters(config, adapters)
    }

    /// Build a router with injected adapters
    ///
    /// Used by tests and by embedders that bring their own provider
    /// implementations.
    ///
    /// # Errors
    ///
    /// Returns an error if a redaction pattern does not compile or a
    /// configured provider has no adapter
    pub fn with_adapters(
        config: &RouterConfig,
        adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    ) -> anyhow::Result<Self> {
        for name in config.providers.keys() {
            if !adapters.contains_key(name) {
                anyhow::bail!("no adapter registered for configured provider '{name}'");
            }
        }

        let redactor = Redactor::new(&config.pii_redaction)?;

        let ledger = BudgetLedger::new();
        for (name, provider_config) in &config.providers {
            ledger.register(name, provider_config.budget_cents);
        }

        Ok(Self {
            enabled: config.enabled,
            registry: ProviderRegistry::new(&config.providers),
            redactor,
            ledger,
            breaker: CircuitBreaker::new(&config.circuit_breaker),
            adapters,
            sanitize_logs: config.logging.sanitize,
        })
    }

    /// Generate a completion through the best eligible provider
    ///
    /// Candidates are attempted in deterministic priority order; the first
    /// success wins and no further candidates are tried.
    ///
    /// # Errors
    ///
    /// Only [`RouterError::Disabled`], [`RouterError::InvalidRequest`],
    /// [`RouterError::NoEligibleProvider`], and
    /// [`RouterError::AllProvidersFailed`] reach the caller; everything
    /// else is recovered by falling back to the next candidate
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, RouterError> {
        if !self.enabled {
            return Err(RouterError::Disabled);
        }

        // Redaction happens before any other provider work so nothing
        // unredacted can reach an adapter or an error message
        let messages = self.outbound_messages(request)?;

        let candidates = self.registry.candidates_for(request);
        if candidates.is_empty() {
            return Err(RouterError::NoEligibleProvider);
        }

        let mut attempts: Vec<ProviderAttempt> = Vec::new();

        for (name, candidate) in candidates {
            match self.breaker.state(name) {
                CircuitState::Open => {
                    tracing::debug!(provider = name, "skipping provider with open circuit");
                    attempts.push(ProviderAttempt {
                        provider: name.to_owned(),
                        failure: ProviderFailure::CircuitOpen,
                    });
                    continue;
                }
                CircuitState::HalfOpen => {
                    tracing::debug!(provider = name, "routing trial request through half-open circuit");
                }
                CircuitState::Closed => {}
            }

            let estimated_cents = estimate_cost_cents(request, candidate);
            if !self.ledger.can_afford(name, estimated_cents) {
                tracing::debug!(
                    provider = name,
                    estimated_cents,
                    remaining_cents = self.ledger.remaining(name),
                    "skipping provider that cannot afford request"
                );
                attempts.push(ProviderAttempt {
                    provider: name.to_owned(),
                    failure: ProviderFailure::BudgetExhausted,
                });
                continue;
            }

            let outbound = OutboundRequest {
                model: request
                    .model
                    .clone()
                    .or_else(|| candidate.models.first().cloned())
                    .unwrap_or_default(),
                messages: messages.clone(),
                max_tokens: request.max_tokens,
            };

            match self.attempt(name, candidate, &outbound, request.schema.as_ref()).await {
                Ok(raw) => {
                    // Debit the actual cost; a rejection means the estimate
                    // undershot and this provider is exhausted, so the
                    // response is discarded and fallback continues
                    if let Err(e) = self.ledger.debit(name, raw.cost_cents) {
                        tracing::warn!(
                            provider = name,
                            cost_cents = raw.cost_cents,
                            remaining_cents = e.remaining_cents,
                            "successful call exceeded remaining budget, discarding response"
                        );
                        self.breaker.record_success(name);
                        attempts.push(ProviderAttempt {
                            provider: name.to_owned(),
                            failure: ProviderFailure::BudgetExhausted,
                        });
                        continue;
                    }

                    self.breaker.record_success(name);

                    return Ok(GenerationResponse {
                        text: raw.text,
                        model: raw.model,
                        tokens_used: raw.tokens_used,
                        cost_cents: raw.cost_cents,
                        provider: name.to_owned(),
                    });
                }
                Err(failure) => {
                    self.breaker.record_failure(name);
                    let failure = self.sanitize_failure(failure);
                    if self.sanitize_logs {
                        tracing::warn!(provider = name, "provider attempt failed, trying next candidate");
                    } else {
                        tracing::warn!(
                            provider = name,
                            error = %failure,
                            "provider attempt failed, trying next candidate"
                        );
                    }
                    attempts.push(ProviderAttempt {
                        provider: name.to_owned(),
                        failure,
                    });
                }
            }
        }

        Err(RouterError::AllProvidersFailed { attempts })
    }

    /// Read-only governance snapshot for dashboards and tests
    pub fn provider_stats(&self) -> BTreeMap<String, ProviderStats> {
        stats::snapshot(&self.registry, &self.ledger, &self.breaker)
    }

    /// Re-initialize all runtime state (budget spend and circuit breakers)
    ///
    /// The only supported way to clear accumulated state short of process
    /// restart; used by test harnesses between cases.
    pub fn reset(&self) {
        self.ledger.reset();
        self.breaker.reset();
    }

    /// One full attempt against a single provider: invoke with inner
    /// retries and a timeout, then validate the payload shape
    async fn attempt(
        &self,
        name: &str,
        candidate: &ProviderConfig,
        outbound: &OutboundRequest,
        response_schema: Option<&serde_json::Value>,
    ) -> Result<RawResponse, ProviderFailure> {
        let Some(adapter) = self.adapters.get(name) else {
            // Construction guarantees an adapter per configured provider
            return Err(ProviderFailure::Adapter(AdapterError::Network(format!(
                "no adapter registered for provider '{name}'"
            ))));
        };

        let timeout = Duration::from_millis(candidate.request_timeout_ms);
        let raw = self
            .invoke_with_retry(adapter.as_ref(), outbound, candidate.retry_attempts, timeout)
            .await?;

        if let Some(response_schema) = response_schema {
            let payload: serde_json::Value = serde_json::from_str(&raw.text).map_err(|_| {
                SchemaMismatch {
                    path: "$".to_owned(),
                    reason: "response body is not valid JSON".to_owned(),
                }
            })?;
            schema::validate(&payload, response_schema)?;
        }

        Ok(raw)
    }

    /// Invoke an adapter, retrying transient failures up to the configured
    /// count; budget and circuit skips never reach this retry loop
    async fn invoke_with_retry(
        &self,
        adapter: &dyn ProviderAdapter,
        outbound: &OutboundRequest,
        retry_attempts: u32,
        timeout: Duration,
    ) -> Result<RawResponse, AdapterError> {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(timeout, adapter.invoke(outbound)).await {
                Ok(result) => result,
                Err(_) => Err(AdapterError::Timeout),
            };

            match result {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_transient() && attempt < retry_attempts => {
                    attempt += 1;
                    tracing::debug!(
                        provider = adapter.name(),
                        attempt,
                        retry_attempts,
                        "retrying transient adapter failure"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Build the redacted outbound conversation, rejecting malformed
    /// requests before any provider work
    fn outbound_messages(&self, request: &GenerationRequest) -> Result<Vec<Message>, RouterError> {
        match (&request.prompt, &request.messages) {
            (Some(_), Some(_)) => Err(RouterError::InvalidRequest(
                "request must set exactly one of `prompt` or `messages`".to_owned(),
            )),
            (None, None) => Err(RouterError::InvalidRequest(
                "request must set `prompt` or `messages`".to_owned(),
            )),
            (Some(prompt), None) => Ok(vec![Message::user(self.redactor.redact(prompt))]),
            (None, Some(messages)) => Ok(self.redactor.redact_messages(messages)),
        }
    }

    /// Prompt fragments echoed by providers must not leak PII into error
    /// detail or logs
    fn sanitize_failure(&self, failure: ProviderFailure) -> ProviderFailure {
        match failure {
            ProviderFailure::Adapter(AdapterError::Network(detail)) => {
                ProviderFailure::Adapter(AdapterError::Network(self.redactor.redact(&detail)))
            }
            ProviderFailure::Adapter(AdapterError::InvalidResponse(detail)) => {
                ProviderFailure::Adapter(AdapterError::InvalidResponse(self.redactor.redact(&detail)))
            }
            other => other,
        }
    }
}

/// Pre-call affordability estimate; the post-call actual cost is
/// authoritative and reconciles any discrepancy
fn estimate_cost_cents(request: &GenerationRequest, config: &ProviderConfig) -> u64 {
    let prompt_chars = match (&request.prompt, &request.messages) {
        (Some(prompt), _) => prompt.len(),
        (None, Some(messages)) => messages.iter().map(|m| m.content.len()).sum(),
        (None, None) => 0,
    };

    // ~4 characters per token, plus the output allowance
    let estimated_tokens =
        prompt_chars as u64 / 4 + u64::from(request.max_tokens.unwrap_or(ESTIMATE_OUTPUT_TOKENS));

    (estimated_tokens * config.cost_per_1k_tokens_cents).div_ceil(1000)
}
