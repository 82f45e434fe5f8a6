//! Layered configuration resolved once at startup.
//!
//! ```rust,no_run
//! use medical_agent::config::{ConfigBuilder, Settings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ConfigBuilder::new().env().build();
//! let settings = Settings::load(&provider).await?;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod memory;
pub mod provider;
pub mod settings;

pub use composite::CompositeConfigProvider;
pub use env::EnvConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::{Settings, keys};

use thiserror::Error;

/// Errors that can occur while resolving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required key not found
    #[error("Key not found: {key}")]
    NotFound { key: String },

    /// Value present but unusable
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// Provider-specific failure
    #[error("Provider error: {message}")]
    Provider { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Fluent assembly of a provider chain. Providers added first win.
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add the process environment
    pub fn env(mut self) -> Self {
        self.providers.push(Box::new(EnvConfigProvider::new()));
        self
    }

    /// Add the process environment, reading `<prefix>KEY` names
    pub fn env_with_prefix(mut self, prefix: &str) -> Self {
        self.providers
            .push(Box::new(EnvConfigProvider::prefixed(prefix)));
        self
    }

    pub fn memory(mut self, provider: MemoryConfigProvider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> CompositeConfigProvider {
        CompositeConfigProvider::new(self.providers)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
