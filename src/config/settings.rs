//! Typed settings snapshot.

use std::time::Duration;

use secrecy::SecretString;

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigError, ConfigResult};
use crate::client::adapter::{
    ANTHROPIC_BASE_URL, DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL, DEFAULT_PROVIDER_TIMEOUT,
    OPENAI_BASE_URL,
};
use crate::payment::{DEFAULT_CURRENCY, DEFAULT_LEDGER_TIMEOUT, STRIPE_BASE_URL};

pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 200_000;

/// Configuration keys. [`EnvConfigProvider`](super::EnvConfigProvider) reads
/// each as the upper-snake environment variable, e.g. `ANTHROPIC_API_KEY`.
pub mod keys {
    pub const ANTHROPIC_API_KEY: &str = "anthropic.api_key";
    pub const ANTHROPIC_BASE_URL: &str = "anthropic.base_url";
    pub const ANTHROPIC_MODEL: &str = "anthropic.model";
    pub const OPENAI_API_KEY: &str = "openai.api_key";
    pub const OPENAI_BASE_URL: &str = "openai.base_url";
    pub const OPENAI_MODEL: &str = "openai.model";
    pub const STRIPE_API_KEY: &str = "stripe.api_key";
    pub const STRIPE_SECRET_KEY: &str = "stripe.secret_key";
    pub const STRIPE_BASE_URL: &str = "stripe.base_url";
    pub const STRIPE_PAYMENT_METHOD: &str = "stripe.payment_method";
    pub const BILLING_CURRENCY: &str = "billing.currency";
    pub const PROVIDER_TIMEOUT_SECS: &str = "provider.timeout_secs";
    pub const LEDGER_TIMEOUT_SECS: &str = "ledger.timeout_secs";
    pub const MAX_DOCUMENT_BYTES: &str = "max.document.bytes";
}

#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct LedgerSettings {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    /// Payment method attached when confirming an intent.
    pub payment_method: Option<String>,
    pub currency: String,
    pub timeout: Duration,
}

/// Everything the service needs, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    pub anthropic: ProviderSettings,
    pub openai: ProviderSettings,
    pub provider_timeout: Duration,
    pub ledger: LedgerSettings,
    pub max_document_bytes: usize,
}

impl Settings {
    pub async fn load(provider: &dyn ConfigProvider) -> ConfigResult<Self> {
        let anthropic = ProviderSettings {
            api_key: provider.get_secret(keys::ANTHROPIC_API_KEY).await?,
            base_url: provider
                .get_string(keys::ANTHROPIC_BASE_URL)
                .await?
                .unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string()),
            model: provider
                .get_string(keys::ANTHROPIC_MODEL)
                .await?
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
        };

        let openai = ProviderSettings {
            api_key: provider.get_secret(keys::OPENAI_API_KEY).await?,
            base_url: provider
                .get_string(keys::OPENAI_BASE_URL)
                .await?
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: provider
                .get_string(keys::OPENAI_MODEL)
                .await?
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        };

        let stripe_key = match provider.get_secret(keys::STRIPE_API_KEY).await? {
            Some(key) => Some(key),
            None => provider.get_secret(keys::STRIPE_SECRET_KEY).await?,
        };

        let currency = provider
            .get_string(keys::BILLING_CURRENCY)
            .await?
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidValue {
                key: keys::BILLING_CURRENCY.to_string(),
                message: "expected a three-letter ISO currency code".to_string(),
            });
        }

        let ledger = LedgerSettings {
            api_key: stripe_key,
            base_url: provider
                .get_string(keys::STRIPE_BASE_URL)
                .await?
                .unwrap_or_else(|| STRIPE_BASE_URL.to_string()),
            payment_method: provider.get_string(keys::STRIPE_PAYMENT_METHOD).await?,
            currency,
            timeout: seconds(provider, keys::LEDGER_TIMEOUT_SECS)
                .await?
                .unwrap_or(DEFAULT_LEDGER_TIMEOUT),
        };

        let max_document_bytes = match provider
            .get_parsed::<usize>(keys::MAX_DOCUMENT_BYTES)
            .await?
        {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: keys::MAX_DOCUMENT_BYTES.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            Some(n) => n,
            None => DEFAULT_MAX_DOCUMENT_BYTES,
        };

        Ok(Self {
            anthropic,
            openai,
            provider_timeout: seconds(provider, keys::PROVIDER_TIMEOUT_SECS)
                .await?
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT),
            ledger,
            max_document_bytes,
        })
    }
}

async fn seconds(provider: &dyn ConfigProvider, key: &str) -> ConfigResult<Option<Duration>> {
    match provider.get_parsed::<u64>(key).await? {
        Some(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "timeout must be at least one second".to_string(),
        }),
        Some(secs) => Ok(Some(Duration::from_secs(secs))),
        None => Ok(None),
    }
}
