//! Provider adapters for hosted completion services.

mod anthropic;
mod base;
mod config;
mod openai;
mod traits;
mod unconfigured;

pub use anthropic::{ANTHROPIC_BASE_URL, AnthropicAdapter};
pub use base::{AuthHeader, RequestExecutor};
pub use config::{
    ANTHROPIC_API_VERSION, DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL,
    DEFAULT_PROVIDER_TIMEOUT, ProviderConfig,
};
pub use openai::{OPENAI_BASE_URL, OpenAiAdapter};
pub use traits::ProviderAdapter;
pub use unconfigured::UnconfiguredAdapter;
