//! Single-step provider fallback policy.

use std::collections::HashSet;

use super::error::{ProviderError, ProviderErrorKind};

/// Decides whether a primary failure is handed to the fallback provider.
///
/// The fallback is attempted at most once per request; there is no further cascading.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    pub triggers: HashSet<FallbackTrigger>,
}

impl FallbackPolicy {
    pub fn new() -> Self {
        Self {
            triggers: Self::default_triggers(),
        }
    }

    /// A policy that never falls back.
    pub fn disabled() -> Self {
        Self {
            triggers: HashSet::new(),
        }
    }

    pub fn trigger(mut self, trigger: FallbackTrigger) -> Self {
        self.triggers.insert(trigger);
        self
    }

    pub fn without(mut self, trigger: FallbackTrigger) -> Self {
        self.triggers.remove(&trigger);
        self
    }

    pub fn should_fallback(&self, error: &ProviderError) -> bool {
        self.triggers.iter().any(|t| t.matches(error))
    }

    fn default_triggers() -> HashSet<FallbackTrigger> {
        [
            FallbackTrigger::RateLimited,
            FallbackTrigger::AuthFailed,
            FallbackTrigger::TimedOut,
            FallbackTrigger::MalformedResponse,
            FallbackTrigger::Unavailable,
        ]
        .into_iter()
        .collect()
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackTrigger {
    RateLimited,
    AuthFailed,
    TimedOut,
    MalformedResponse,
    Unavailable,
}

impl FallbackTrigger {
    pub fn matches(&self, error: &ProviderError) -> bool {
        match self {
            Self::RateLimited => error.kind == ProviderErrorKind::RateLimit,
            Self::AuthFailed => error.kind == ProviderErrorKind::Auth,
            Self::TimedOut => error.kind == ProviderErrorKind::Timeout,
            Self::MalformedResponse => error.kind == ProviderErrorKind::MalformedResponse,
            Self::Unavailable => error.kind == ProviderErrorKind::Unavailable,
        }
    }
}
