//! Common request execution for HTTP adapters.

use secrecy::{ExposeSecret, SecretString};

use super::config::ProviderConfig;
use crate::client::error::{ProviderError, ProviderResult};

/// How an adapter presents its credential.
#[derive(Debug, Clone)]
pub enum AuthHeader {
    /// `x-api-key: <key>`
    ApiKey(SecretString),
    /// `Authorization: Bearer <key>`
    Bearer(SecretString),
}

impl AuthHeader {
    fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::ApiKey(key) => req.header("x-api-key", key.expose_secret()),
            Self::Bearer(key) => req.bearer_auth(key.expose_secret()),
        }
    }
}

pub struct RequestExecutor;

impl RequestExecutor {
    /// POST a JSON body and return the decoded JSON response.
    ///
    /// Every non-success outcome is classified into a `ProviderError`; nothing is retried.
    pub async fn post_json(
        provider: &'static str,
        http: &reqwest::Client,
        config: &ProviderConfig,
        path: &str,
        auth: &AuthHeader,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> ProviderResult<serde_json::Value> {
        let mut req = http
            .post(config.endpoint(path))
            .timeout(config.timeout)
            .header("content-type", "application/json")
            .json(body);

        req = auth.apply(req);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        for (name, value) in &config.extra_headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(provider, &e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(provider, &e))?;

        if !(200..300).contains(&status) {
            return Err(ProviderError::from_status(provider, status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::malformed(provider, format!("invalid JSON body: {}", e))
                .with_status(status)
        })
    }
}
