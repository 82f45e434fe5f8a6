use async_trait::async_trait;

use super::config::ProviderConfig;
use super::traits::ProviderAdapter;
use crate::client::error::{ProviderError, ProviderErrorKind, ProviderResult};
use crate::client::messages::{Completion, CompletionRequest};

/// Stand-in for a provider whose credential was not supplied at startup.
#[derive(Debug)]
pub struct UnconfiguredAdapter {
    name: &'static str,
    config: ProviderConfig,
}

impl UnconfiguredAdapter {
    pub fn new(name: &'static str, config: ProviderConfig) -> Self {
        Self { name, config }
    }
}

#[async_trait]
impl ProviderAdapter for UnconfiguredAdapter {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn complete(&self, _request: &CompletionRequest) -> ProviderResult<Completion> {
        Err(ProviderError::new(
            ProviderErrorKind::Unavailable,
            self.name,
            "provider credential not configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_unavailable() {
        let adapter =
            UnconfiguredAdapter::new("openai", ProviderConfig::new("gpt-4o", "http://unused"));
        assert!(!adapter.is_configured());
        let err = adapter
            .complete(&CompletionRequest::new("s", "d", 10))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Unavailable);
        assert_eq!(err.provider, "openai");
    }
}
