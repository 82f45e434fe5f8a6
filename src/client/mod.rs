//! Hosted completion providers: adapters, errors and the fallback policy.

pub mod adapter;
mod error;
pub mod fallback;
mod messages;

pub use adapter::{
    AnthropicAdapter, OpenAiAdapter, ProviderAdapter, ProviderConfig, UnconfiguredAdapter,
};
pub use error::{ProviderError, ProviderErrorKind, ProviderResult};
pub use fallback::{FallbackPolicy, FallbackTrigger};
pub use messages::{Completion, CompletionRequest, DEFAULT_TEMPERATURE};
