use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Wire protocol spoken by a provider endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions API
    Openai,
    /// Anthropic-compatible messages API
    Anthropic,
}

/// Configuration for a single upstream provider
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Wire protocol
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Whether this provider may be selected
    #[serde(default = "crate::default_true")]
    pub enabled: bool,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Models this provider serves; the first entry is the default when a
    /// request does not pin a model
    pub models: Vec<String>,
    /// Spend ceiling in integer cents
    pub budget_cents: u64,
    /// Selection order; lower is tried first
    #[serde(default)]
    pub priority: u32,
    /// Inner retries for transient adapter failures (total attempts = 1 + retries)
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Rate used for the pre-call affordability estimate; the post-call
    /// actual cost is authoritative
    #[serde(default = "default_cost_rate")]
    pub cost_per_1k_tokens_cents: u64,
    /// Upper bound on a single adapter invocation
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

const fn default_retry_attempts() -> u32 {
    2
}

const fn default_cost_rate() -> u64 {
    3
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_provider_gets_defaults() {
        let config: ProviderConfig = toml::from_str(
            r#"
            type = "openai"
            models = ["gpt-4o-mini"]
            budget_cents = 5000
            "#,
        )
        .unwrap();

        assert!(config.enabled);
        assert_eq!(config.priority, 0);
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.cost_per_1k_tokens_cents, 3);
        assert_eq!(config.request_timeout_ms, 30_000);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result: Result<ProviderConfig, _> = toml::from_str(
            r#"
            type = "openai"
            models = ["gpt-4o-mini"]
            budget_cents = 5000
            shiny = true
            "#,
        );
        assert!(result.is_err());
    }
}
