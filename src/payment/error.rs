//! Payment processor error types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

const MAX_MESSAGE_LEN: usize = 200;

/// The ledger call that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOperation {
    CreateCustomer,
    GetCustomer,
    ListPayments,
    CreateIntent,
    GetIntent,
    ConfirmIntent,
}

impl LedgerOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCustomer => "create_customer",
            Self::GetCustomer => "get_customer",
            Self::ListPayments => "list_payments",
            Self::CreateIntent => "create_intent",
            Self::GetIntent => "get_intent",
            Self::ConfirmIntent => "confirm_intent",
        }
    }

    pub fn targets_intent(&self) -> bool {
        matches!(self, Self::GetIntent | Self::ConfirmIntent)
    }
}

impl fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerErrorKind {
    /// The resource already exists.
    Conflict,
    NotFound,
    /// The processor refused the request (validation, card error, minimum amount).
    Rejected,
    /// Network failure, timeout, rate limit or processor outage.
    Unavailable,
    /// The processor refused our credential.
    Auth,
    /// The processor answered with something we could not decode.
    Malformed,
}

impl LedgerErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Rejected => "rejected",
            Self::Unavailable => "unavailable",
            Self::Auth => "auth",
            Self::Malformed => "malformed",
        }
    }
}

impl fmt::Display for LedgerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("ledger {operation} {kind}: {message}")]
pub struct LedgerError {
    pub kind: LedgerErrorKind,
    pub operation: LedgerOperation,
    pub status: Option<u16>,
    /// Identifier of the resource involved, e.g. the existing customer on conflict.
    pub resource_id: Option<String>,
    /// Processor error code such as `card_declined`.
    pub code: Option<String>,
    pub message: String,
}

impl LedgerError {
    pub fn new(
        kind: LedgerErrorKind,
        operation: LedgerOperation,
        message: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if message.len() > MAX_MESSAGE_LEN {
            let mut end = MAX_MESSAGE_LEN;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
            message.push_str("...");
        }
        Self {
            kind,
            operation,
            status: None,
            resource_id: None,
            code: None,
            message,
        }
    }

    pub fn with_resource(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn malformed(operation: LedgerOperation, message: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Malformed, operation, message)
    }

    pub fn unavailable(operation: LedgerOperation, message: impl Into<String>) -> Self {
        Self::new(LedgerErrorKind::Unavailable, operation, message)
    }

    /// Classify a non-success HTTP response from the processor.
    pub fn from_status(operation: LedgerOperation, status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => LedgerErrorKind::Auth,
            404 => LedgerErrorKind::NotFound,
            409 => LedgerErrorKind::Conflict,
            429 => LedgerErrorKind::Unavailable,
            400..=499 => LedgerErrorKind::Rejected,
            _ => LedgerErrorKind::Unavailable,
        };
        let detail: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let message = detail
            .as_ref()
            .and_then(|d| d.pointer("/error/message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));
        let mut err = Self::new(kind, operation, message);
        err.status = Some(status);
        err.code = detail
            .as_ref()
            .and_then(|d| d.pointer("/error/code"))
            .and_then(|c| c.as_str())
            .map(str::to_string);
        err
    }

    pub fn from_transport(operation: LedgerOperation, error: &reqwest::Error) -> Self {
        let kind = if error.is_decode() {
            LedgerErrorKind::Malformed
        } else {
            LedgerErrorKind::Unavailable
        };
        Self::new(kind, operation, error.to_string())
    }

    /// A card error: the processor accepted the request but declined the charge.
    pub fn is_card_error(&self) -> bool {
        self.status == Some(402)
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let cases = [
            (401, LedgerErrorKind::Auth),
            (402, LedgerErrorKind::Rejected),
            (404, LedgerErrorKind::NotFound),
            (409, LedgerErrorKind::Conflict),
            (400, LedgerErrorKind::Rejected),
            (429, LedgerErrorKind::Unavailable),
            (500, LedgerErrorKind::Unavailable),
        ];
        for (status, kind) in cases {
            assert_eq!(
                LedgerError::from_status(LedgerOperation::CreateIntent, status, "").kind,
                kind,
                "status {}",
                status
            );
        }
    }

    #[test]
    fn test_processor_message_and_code() {
        let body = r#"{"error": {"code": "card_declined",
            "message": "Your card was declined.", "type": "card_error"}}"#;
        let err = LedgerError::from_status(LedgerOperation::ConfirmIntent, 402, body);
        assert!(err.is_card_error());
        assert_eq!(err.code.as_deref(), Some("card_declined"));
        assert_eq!(err.message, "Your card was declined.");
        assert!(err.to_string().contains("confirm_intent"));
    }
}
