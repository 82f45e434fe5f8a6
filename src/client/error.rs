//! Provider error types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on provider-supplied error text kept in a `ProviderError`.
const MAX_MESSAGE_LEN: usize = 200;

/// Distinguishing cause of a failed completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderErrorKind {
    RateLimit,
    Auth,
    Timeout,
    MalformedResponse,
    Unavailable,
    /// The provider rejected the caller's document. Not a provider fault.
    InvalidDocument,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "RATE_LIMIT",
            Self::Auth => "AUTH",
            Self::Timeout => "TIMEOUT",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::Unavailable => "UNAVAILABLE",
            Self::InvalidDocument => "INVALID_DOCUMENT",
        }
    }

    pub fn is_provider_fault(&self) -> bool {
        !matches!(self, Self::InvalidDocument)
    }

    /// Whether the same request may succeed if sent again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Timeout | Self::Unavailable)
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed completion from a single provider.
#[derive(Debug, Clone, Error)]
#[error("{provider} {kind}{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub provider: &'static str,
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(
        kind: ProviderErrorKind,
        provider: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            provider,
            status: None,
            message: truncate(message.into()),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::MalformedResponse, provider, message)
    }

    /// Classify a non-success HTTP response.
    pub fn from_status(provider: &'static str, status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Auth,
            429 => ProviderErrorKind::RateLimit,
            408 | 504 => ProviderErrorKind::Timeout,
            400 | 413 | 422 => ProviderErrorKind::InvalidDocument,
            _ => ProviderErrorKind::Unavailable,
        };
        Self::new(kind, provider, error_message(body).unwrap_or_else(|| format!("HTTP {}", status)))
            .with_status(status)
    }

    /// Classify a transport-level failure.
    pub fn from_transport(provider: &'static str, error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            ProviderErrorKind::Timeout
        } else if error.is_decode() {
            ProviderErrorKind::MalformedResponse
        } else {
            ProviderErrorKind::Unavailable
        };
        let mut err = Self::new(kind, provider, error.to_string());
        err.status = error.status().map(|s| s.as_u16());
        err
    }
}

/// Pull `error.message` (or a top-level `message`) out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.pointer("/error/message")
        .or_else(|| json.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

fn truncate(mut message: String) -> String {
    if message.len() > MAX_MESSAGE_LEN {
        let mut end = MAX_MESSAGE_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
        message.push_str("...");
    }
    message
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
