//! Anthropic-compatible provider adapter

use async_trait::async_trait;
use palisade_config::ProviderConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{OutboundRequest, ProviderAdapter, RawResponse, classify_status, classify_transport_error, cost_from_usage};
use crate::error::AdapterError;
use crate::types::Role;

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

const API_VERSION: &str = "2023-06-01";

/// Output ceiling when the caller does not set one; the messages API
/// requires `max_tokens` on every request
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Adapter for Anthropic-compatible messages endpoints
pub struct AnthropicAdapter {
    name: String,
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    cost_per_1k_tokens_cents: u64,
}

impl AnthropicAdapter {
    /// Create from provider configuration
    pub fn new(name: String, config: &ProviderConfig) -> Self {
        let base_url = config
            .base_url
            .as_ref()
            .map_or_else(|| DEFAULT_BASE_URL.to_owned(), |url| url.as_str().to_owned());

        Self {
            name,
            client: Client::new(),
            base_url,
            api_key: config.api_key.clone(),
            cost_per_1k_tokens_cents: config.cost_per_1k_tokens_cents,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url.trim_end_matches('/'))
    }
}

// -- Wire types --

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    model: String,
    content: Vec<WireContentBlock>,
    usage: WireUsage,
}

#[derive(Deserialize)]
struct WireContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &OutboundRequest) -> Result<RawResponse, AdapterError> {
        // The messages API takes system prompts as a top-level field
        let system_parts: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let system = (!system_parts.is_empty()).then(|| system_parts.join("\n"));

        let wire_request = WireRequest {
            model: &request.model,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            messages: request
                .messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        };

        let mut builder = self
            .client
            .post(self.messages_url())
            .header("anthropic-version", API_VERSION)
            .json(&wire_request);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let body: WireResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;

        let text: String = body
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(AdapterError::InvalidResponse(
                "response contains no text content".to_owned(),
            ));
        }

        let tokens_used = body.usage.input_tokens + body.usage.output_tokens;

        Ok(RawResponse {
            text,
            model: body.model,
            tokens_used,
            cost_cents: cost_from_usage(tokens_used, self.cost_per_1k_tokens_cents),
        })
    }
}
