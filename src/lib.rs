//! # medical-agent
//!
//! Payment-gated medical document analysis over LLM providers.
//!
//! A document is analyzed at one of four tiers. Each tier fixes a prompt,
//! a token budget, a structured response shape and a price. Paid analysis
//! runs only after the payment processor reports a succeeded intent whose
//! amount matches the local quote.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use medical_agent::config::{ConfigBuilder, Settings};
//! use medical_agent::{MedicalAgent, ToolRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), medical_agent::Error> {
//!     let settings = Settings::load(&ConfigBuilder::new().env().build()).await?;
//!     let agent = Arc::new(MedicalAgent::from_settings(&settings));
//!     let tools = ToolRegistry::medical(agent);
//!
//!     let output = tools
//!         .execute(
//!             "calculate_billing",
//!             serde_json::json!({"analysis_type": "basic", "document_count": 12}),
//!         )
//!         .await;
//!     println!("{}", output.payload());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod analysis;
pub mod billing;
pub mod client;
pub mod config;
pub mod gate;
pub mod observability;
pub mod patients;
pub mod payment;
pub mod prompts;
pub mod service;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{AnalysisDispatcher, parse_structured};
pub use billing::{BillingCalculator, BillingQuote, DiscountPolicy};
pub use client::{
    AnthropicAdapter, FallbackPolicy, FallbackTrigger, OpenAiAdapter, ProviderAdapter,
    ProviderConfig, ProviderError, ProviderErrorKind,
};
pub use gate::ExecutionGate;
pub use observability::{TracingConfig, init_tracing};
pub use patients::{PatientDirectory, PatientSummary, SampleDirectory};
pub use payment::{
    Customer, IntentStatus, PaymentIntent, PaymentLedgerAdapter, PaymentWorkflow, StripeLedger,
};
pub use prompts::{PromptCatalog, PromptSpec};
pub use service::MedicalAgent;
pub use tools::{SchemaTool, Tool, ToolRegistry};
pub use types::{
    AnalysisRequest, AnalysisResult, AnalysisTier, Extraction, PaymentReceipt, TokenUsage,
    ToolOutput,
};

use serde_json::{Value, json};

/// Error type for medical-agent operations.
///
/// Every variant maps to a machine-readable `kind`, the collaborator that
/// failed and a retry hint; see [`Error::to_payload`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Analysis tier name not recognized.
    #[error("Unknown analysis type '{tier}'; expected one of basic, comprehensive, batch, complicated")]
    UnknownTier { tier: String },

    /// Document count below one or too large to price.
    #[error("Invalid document count {count}; must be a positive integer")]
    InvalidQuantity { count: i64 },

    /// Document rejected locally or by a provider.
    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    /// Primary provider failed and the fallback failed or was not attempted.
    #[error("Analysis unavailable: {primary}{}", .fallback.as_ref().map(|f| format!("; fallback: {}", f)).unwrap_or_default())]
    AnalysisUnavailable {
        primary: client::ProviderError,
        fallback: Option<client::ProviderError>,
    },

    #[error("A customer with this email already exists: {customer_id}")]
    DuplicateCustomer { customer_id: String },

    #[error("Customer not found: {customer_id}")]
    CustomerNotFound { customer_id: String },

    #[error("Payment intent not found: {intent_id}")]
    IntentNotFound { intent_id: String },

    /// Payment did not succeed; no analysis was performed.
    #[error("Payment required: intent {intent_id} is {status}")]
    PaymentRequired {
        intent_id: String,
        status: payment::IntentStatus,
    },

    /// The processor refused the request (card error, minimum amount, validation).
    #[error("Payment rejected: {message}")]
    PaymentRejected { message: String },

    /// Processor amount differs from the locally computed quote.
    #[error("Payment intent {intent_id} does not match its quote")]
    AmountMismatch {
        intent_id: String,
        expected_minor: i64,
        actual_minor: i64,
    },

    /// Intent carries no recognizable quote metadata.
    #[error("Payment intent {intent_id} was not created by this service")]
    UnrecognizedIntent { intent_id: String },

    #[error("Payment processor unavailable during {operation}: {message}")]
    LedgerUnavailable {
        operation: payment::LedgerOperation,
        message: String,
    },

    /// Payment succeeded but analysis failed afterwards.
    #[error("Payment {intent_id} succeeded but analysis failed: {source}")]
    PaidAnalysisFailed {
        intent_id: String,
        source: Box<Error>,
    },

    #[error("Patient not found: {patient_id}")]
    PatientNotFound { patient_id: String },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller input that will never succeed as given
    Validation,
    /// Payment refused, required, or inconsistent
    Payment,
    /// Provider or processor outages that may succeed on retry
    Transient,
    /// Customer, intent or patient does not exist
    NotFound,
    /// Missing credentials or bad settings
    Configuration,
    /// Serialization or unexpected states
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownTier { .. }
            | Error::InvalidQuantity { .. }
            | Error::InvalidDocument { .. }
            | Error::DuplicateCustomer { .. } => ErrorCategory::Validation,

            Error::PaymentRequired { .. }
            | Error::PaymentRejected { .. }
            | Error::AmountMismatch { .. }
            | Error::UnrecognizedIntent { .. }
            | Error::PaidAnalysisFailed { .. } => ErrorCategory::Payment,

            Error::AnalysisUnavailable { .. } | Error::LedgerUnavailable { .. } => {
                ErrorCategory::Transient
            }

            Error::CustomerNotFound { .. }
            | Error::IntentNotFound { .. }
            | Error::PatientNotFound { .. } => ErrorCategory::NotFound,

            Error::Config(_) => ErrorCategory::Configuration,

            Error::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Stable snake_case identifier for tool payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownTier { .. } => "unknown_tier",
            Error::InvalidQuantity { .. } => "invalid_quantity",
            Error::InvalidDocument { .. } => "invalid_document",
            Error::AnalysisUnavailable { .. } => "analysis_unavailable",
            Error::DuplicateCustomer { .. } => "duplicate_customer",
            Error::CustomerNotFound { .. } => "customer_not_found",
            Error::IntentNotFound { .. } => "intent_not_found",
            Error::PaymentRequired { .. } => "payment_required",
            Error::PaymentRejected { .. } => "payment_rejected",
            Error::AmountMismatch { .. } => "amount_mismatch",
            Error::UnrecognizedIntent { .. } => "unrecognized_intent",
            Error::LedgerUnavailable { .. } => "ledger_unavailable",
            Error::PaidAnalysisFailed { .. } => "paid_analysis_failed",
            Error::PatientNotFound { .. } => "patient_not_found",
            Error::Config(_) => "configuration",
            Error::Json(_) => "internal",
        }
    }

    /// Which collaborator the failure belongs to.
    pub fn collaborator(&self) -> &'static str {
        match self {
            Error::UnknownTier { .. }
            | Error::InvalidQuantity { .. }
            | Error::InvalidDocument { .. } => "caller",
            Error::AnalysisUnavailable { .. } | Error::PaidAnalysisFailed { .. } => "providers",
            Error::DuplicateCustomer { .. }
            | Error::CustomerNotFound { .. }
            | Error::IntentNotFound { .. }
            | Error::PaymentRequired { .. }
            | Error::PaymentRejected { .. }
            | Error::AmountMismatch { .. }
            | Error::UnrecognizedIntent { .. }
            | Error::LedgerUnavailable { .. } => "payment_processor",
            Error::PatientNotFound { .. } => "patient_directory",
            Error::Config(_) => "configuration",
            Error::Json(_) => "service",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Error::AnalysisUnavailable { primary, fallback } => {
                primary.kind.is_transient()
                    || fallback.as_ref().is_some_and(|f| f.kind.is_transient())
            }
            // A failed confirm may still have charged.
            Error::LedgerUnavailable { operation, .. } => {
                *operation != payment::LedgerOperation::ConfirmIntent
            }
            _ => false,
        }
    }

    pub fn is_payment_error(&self) -> bool {
        self.category() == ErrorCategory::Payment
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Intent involved in the failure, if any.
    pub fn intent_id(&self) -> Option<&str> {
        match self {
            Error::PaymentRequired { intent_id, .. }
            | Error::AmountMismatch { intent_id, .. }
            | Error::UnrecognizedIntent { intent_id }
            | Error::IntentNotFound { intent_id }
            | Error::PaidAnalysisFailed { intent_id, .. } => Some(intent_id),
            _ => None,
        }
    }

    /// Structured error body returned to tool callers.
    pub fn to_payload(&self) -> Value {
        let mut body = json!({
            "kind": self.kind(),
            "collaborator": self.collaborator(),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        });

        match self {
            Error::AnalysisUnavailable { primary, fallback } => {
                body["primary_kind"] = json!(primary.kind.as_str());
                body["fallback_kind"] = json!(fallback.as_ref().map(|f| f.kind.as_str()));
            }
            Error::PaymentRequired { status, .. } => {
                body["status"] = json!(status.as_str());
            }
            Error::PaidAnalysisFailed { source, .. } => {
                body["analysis_error"] = json!(source.kind());
            }
            Error::DuplicateCustomer { customer_id } => {
                body["customer_id"] = json!(customer_id);
            }
            _ => {}
        }
        if let Some(intent_id) = self.intent_id() {
            body["intent_id"] = json!(intent_id);
        }

        json!({ "error": body })
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound { key } => {
                Error::Config(format!("Key not found: {}", key))
            }
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Env(e) => Error::Config(e.to_string()),
            config::ConfigError::Provider { message } => Error::Config(message),
        }
    }
}

impl From<payment::LedgerError> for Error {
    fn from(err: payment::LedgerError) -> Self {
        use payment::LedgerErrorKind;

        let resource = err.resource_id.clone().unwrap_or_default();
        match err.kind {
            LedgerErrorKind::Conflict => Error::DuplicateCustomer {
                customer_id: resource,
            },
            LedgerErrorKind::NotFound if err.operation.targets_intent() => Error::IntentNotFound {
                intent_id: resource,
            },
            LedgerErrorKind::NotFound => Error::CustomerNotFound {
                customer_id: resource,
            },
            LedgerErrorKind::Rejected => Error::PaymentRejected {
                message: err.message,
            },
            LedgerErrorKind::Unavailable | LedgerErrorKind::Auth | LedgerErrorKind::Malformed => {
                Error::LedgerUnavailable {
                    operation: err.operation,
                    message: err.message,
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
