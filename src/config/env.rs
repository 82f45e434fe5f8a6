//! Environment variable configuration provider
//!
//! Dotted keys map to upper-snake variable names: `stripe.api_key` reads
//! `STRIPE_API_KEY`.

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult};

/// Read-only environment variable configuration provider.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let name = key.to_uppercase().replace('.', "_");
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, name),
            None => name,
        }
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        match std::env::var(self.env_key(key)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_conversion() {
        let provider = EnvConfigProvider::new();
        assert_eq!(provider.env_key("anthropic.api_key"), "ANTHROPIC_API_KEY");
        assert_eq!(provider.env_key("max_document_bytes"), "MAX_DOCUMENT_BYTES");

        let provider = EnvConfigProvider::prefixed("MEDICAL_");
        assert_eq!(provider.env_key("stripe.api_key"), "MEDICAL_STRIPE_API_KEY");
    }

    #[tokio::test]
    async fn test_env_provider_get() {
        let provider = EnvConfigProvider::prefixed("MEDICAL_AGENT_TEST_");

        // SAFETY: Test-only environment setup with a unique prefix
        unsafe { std::env::set_var("MEDICAL_AGENT_TEST_BILLING_CURRENCY", "eur") };
        let value = provider.get_raw("billing.currency").await.unwrap();
        assert_eq!(value, Some("eur".to_string()));
        unsafe { std::env::remove_var("MEDICAL_AGENT_TEST_BILLING_CURRENCY") };
    }

    #[tokio::test]
    async fn test_env_provider_not_found() {
        let provider = EnvConfigProvider::prefixed("NONEXISTENT_PREFIX_");
        assert_eq!(provider.get_raw("some.key").await.unwrap(), None);
    }
}
