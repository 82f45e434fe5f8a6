//! Configuration provider trait

use std::str::FromStr;

use secrecy::SecretString;

use super::{ConfigError, ConfigResult};

/// A read-only source of configuration values keyed by dotted names
/// such as `anthropic.api_key`.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Get a raw configuration value
    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;
}

/// Typed accessors layered over [`ConfigProvider::get_raw`].
///
/// Blank values are treated as absent so an exported-but-empty variable
/// behaves like an unset one.
pub trait ConfigProviderExt: ConfigProvider {
    fn get_string(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<String>>> + Send
    where
        Self: Sync,
    {
        async move {
            Ok(self
                .get_raw(key)
                .await?
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()))
        }
    }

    fn get_secret(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<SecretString>>> + Send
    where
        Self: Sync,
    {
        async move { Ok(self.get_string(key).await?.map(SecretString::from)) }
    }

    /// Parse a value with [`FromStr`], reporting the key on failure.
    fn get_parsed<T>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
        T: FromStr + Send,
        T::Err: std::fmt::Display,
    {
        async move {
            match self.get_string(key).await? {
                Some(raw) => raw.parse::<T>().map(Some).map_err(|e| {
                    ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    }
                }),
                None => Ok(None),
            }
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}
