//! Provider adapter trait definition.

use std::fmt::Debug;

use async_trait::async_trait;

use super::config::ProviderConfig;
use crate::client::error::ProviderResult;
use crate::client::messages::{Completion, CompletionRequest};

/// Uniform interface over a hosted completion service.
///
/// Implementations must not retry internally; retry and fallback belong to the caller.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
    fn config(&self) -> &ProviderConfig;

    fn name(&self) -> &'static str;

    fn model(&self) -> &str {
        &self.config().model
    }

    /// False for stand-ins that fail every call without network I/O.
    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion>;
}
