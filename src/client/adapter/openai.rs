//! OpenAI Chat Completions adapter, used as the fallback provider.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;

use super::base::{AuthHeader, RequestExecutor};
use super::config::{DEFAULT_OPENAI_MODEL, ProviderConfig};
use super::traits::ProviderAdapter;
use crate::client::error::{ProviderError, ProviderResult};
use crate::client::messages::{Completion, CompletionRequest};
use crate::types::TokenUsage;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
const COMPLETIONS_ENDPOINT: &str = "/v1/chat/completions";
const NAME: &str = "openai";

pub struct OpenAiAdapter {
    config: ProviderConfig,
    auth: AuthHeader,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("config", &self.config)
            .finish()
    }
}

impl OpenAiAdapter {
    pub fn new(config: ProviderConfig, api_key: SecretString) -> Self {
        Self::with_http(config, api_key, reqwest::Client::new())
    }

    pub fn with_http(config: ProviderConfig, api_key: SecretString, http: reqwest::Client) -> Self {
        Self {
            config,
            auth: AuthHeader::Bearer(api_key),
            http,
        }
    }

    pub fn default_config() -> ProviderConfig {
        ProviderConfig::new(DEFAULT_OPENAI_MODEL, OPENAI_BASE_URL)
    }

    fn transform_request(&self, request: &CompletionRequest) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_message()}
            ],
        })
    }

    fn transform_response(&self, response: serde_json::Value) -> ProviderResult<Completion> {
        let parsed: ChatResponse = serde_json::from_value(response)
            .map_err(|e| {
                ProviderError::malformed(NAME, format!("unexpected response shape: {}", e))
            })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::malformed(NAME, "response contained no message content")
            })?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(Completion {
            text,
            usage,
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
        })
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
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
            COMPLETIONS_ENDPOINT,
            &self.auth,
            &[],
            &body,
        )
        .await?;
        self.transform_response(json)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
