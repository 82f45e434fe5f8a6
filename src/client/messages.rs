//! Provider-neutral completion request and response.

use std::fmt;

use crate::prompts::{USER_POSTAMBLE, USER_PREAMBLE};
use crate::types::TokenUsage;

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

const DOCUMENT_OPEN: &str = "=== MEDICAL DOCUMENT ===";
const DOCUMENT_CLOSE: &str = "=== END DOCUMENT ===";

#[derive(Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub document: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        document: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            document: document.into(),
            max_tokens,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The user turn: the document between fixed delimiters plus the output reminder.
    pub fn user_message(&self) -> String {
        format!(
            "{}\n\n{}\n{}\n{}\n\n{}",
            USER_PREAMBLE, DOCUMENT_OPEN, self.document, DOCUMENT_CLOSE, USER_POSTAMBLE
        )
    }
}

impl fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("system_prompt_bytes", &self.system_prompt.len())
            .field("document_bytes", &self.document.len())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Raw completion text plus reported usage. The text is untrusted.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_wraps_document() {
        let request = CompletionRequest::new("system", "BP 120/80", 1000);
        let message = request.user_message();
        let open = message.find(DOCUMENT_OPEN).unwrap();
        let body = message.find("BP 120/80").unwrap();
        let close = message.find(DOCUMENT_CLOSE).unwrap();
        assert!(open < body && body < close);
    }

    #[test]
    fn test_debug_omits_document() {
        let request = CompletionRequest::new("system", "patient has diabetes", 1000);
        assert!(!format!("{:?}", request).contains("diabetes"));
    }
}
