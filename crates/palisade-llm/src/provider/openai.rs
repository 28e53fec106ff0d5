//! OpenAI-compatible provider adapter

use async_trait::async_trait;
use palisade_config::ProviderConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{OutboundRequest, ProviderAdapter, RawResponse, classify_status, classify_transport_error, cost_from_usage};
use crate::error::AdapterError;

/// Default OpenAI API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Adapter for OpenAI-compatible chat completion endpoints
pub struct OpenAiAdapter {
    name: String,
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    cost_per_1k_tokens_cents: u64,
}

impl OpenAiAdapter {
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

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// -- Wire types --

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    total_tokens: u32,
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &OutboundRequest) -> Result<RawResponse, AdapterError> {
        let wire_request = WireRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
        };

        let mut builder = self.client.post(self.completions_url()).json(&wire_request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
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

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AdapterError::InvalidResponse("response contains no choices".to_owned()))?;

        let tokens_used = body.usage.map_or(0, |usage| usage.total_tokens);

        Ok(RawResponse {
            text,
            model: body.model,
            tokens_used,
            cost_cents: cost_from_usage(tokens_used, self.cost_per_1k_tokens_cents),
        })
    }
}
