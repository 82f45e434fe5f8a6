//! Anthropic Messages API adapter.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;

use super::base::{AuthHeader, RequestExecutor};
use super::config::{ANTHROPIC_API_VERSION, DEFAULT_ANTHROPIC_MODEL, ProviderConfig};
use super::traits::ProviderAdapter;
use crate::client::error::{ProviderError, ProviderResult};
use crate::client::messages::{Completion, CompletionRequest};
use crate::types::TokenUsage;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const MESSAGES_ENDPOINT: &str = "/v1/messages";
const NAME: &str = "anthropic";

pub struct AnthropicAdapter {
    config: ProviderConfig,
    auth: AuthHeader,
    http: reqwest::Client,
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("config", &self.config)
            .finish()
    }
}

impl AnthropicAdapter {
    pub fn new(config: ProviderConfig, api_key: SecretString) -> Self {
        Self::with_http(config, api_key, reqwest::Client::new())
    }

    pub fn with_http(config: ProviderConfig, api_key: SecretString, http: reqwest::Client) -> Self {
        Self {
            config,
            auth: AuthHeader::ApiKey(api_key),
            http,
        }
    }

    pub fn default_config() -> ProviderConfig {
        ProviderConfig::new(DEFAULT_ANTHROPIC_MODEL, ANTHROPIC_BASE_URL)
    }

    fn transform_request(&self, request: &CompletionRequest) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": request.system_prompt,
            "messages": [
                {"role": "user", "content": request.user_message()}
            ],
        })
    }

    fn transform_response(&self, response: serde_json::Value) -> ProviderResult<Completion> {
        let parsed: MessagesResponse = serde_json::from_value(response)
            .map_err(|e| {
                ProviderError::malformed(NAME, format!("unexpected response shape: {}", e))
            })?;

        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ProviderError::malformed(NAME, "response contained no text content"));
        }

        Ok(Completion {
            text,
            usage: TokenUsage::new(parsed.usage.input_tokens, parsed.usage.output_tokens),
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
        })
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        NAME
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        let body = self.transform_request(request);
        let json = RequestExecutor::post_json(
            NAME,
            &self.http,
            &self.config,
            MESSAGES_ENDPOINT,
            &self.auth,
            &[("anthropic-version", ANTHROPIC_API_VERSION)],
            &body,
        )
        .await?;
        self.transform_response(json)
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}
