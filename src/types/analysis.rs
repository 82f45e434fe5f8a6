//! Analysis request and result types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AnalysisTier, TokenUsage};

/// A document submitted for analysis. Request-scoped; never persisted.
#[derive(Clone)]
pub struct AnalysisRequest {
    pub document_content: String,
    pub tier: AnalysisTier,
    pub patient_id: Option<String>,
}

impl AnalysisRequest {
    pub fn new(document_content: impl Into<String>, tier: AnalysisTier) -> Self {
        Self {
            document_content: document_content.into(),
            tier,
            patient_id: None,
        }
    }

    pub fn with_patient_id(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }
}

// Document content is kept out of Debug so requests can be logged safely.
impl fmt::Debug for AnalysisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("document_bytes", &self.document_content.len())
            .field("tier", &self.tier)
            .field("patient_id", &self.patient_id)
            .finish()
    }
}

/// Which configured provider produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Primary,
    Fallback,
}

impl fmt::Display for ProviderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// Value extracted for one response-shape category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Extraction {
    Found(serde_json::Value),
    NotFound,
}

impl Extraction {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }
}

/// Settlement details attached to a paid analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub intent_id: String,
    pub amount: Decimal,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub tier: AnalysisTier,
    /// Keys are exactly the tier's response shape.
    pub structured_fields: BTreeMap<String, Extraction>,
    pub provider_used: ProviderRole,
    /// Adapter name of the provider that answered, e.g. "anthropic".
    pub provider: String,
    pub model: String,
    pub token_usage: TokenUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentReceipt>,
}

impl AnalysisResult {
    pub fn fields_found(&self) -> usize {
        self.structured_fields
            .values()
            .filter(|e| e.is_found())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.fields_found() == self.structured_fields.len()
    }

    pub fn field(&self, category: &str) -> Option<&Extraction> {
        self.structured_fields.get(category)
    }

    pub fn with_payment(mut self, receipt: PaymentReceipt) -> Self {
        self.payment = Some(receipt);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_debug_hides_document() {
        let request = AnalysisRequest::new("BP 150/95, chest pain", AnalysisTier::Basic);
        let debug = format!("{:?}", request);
        assert!(!debug.contains("chest pain"));
        assert!(debug.contains("document_bytes"));
    }

    #[test]
    fn test_extraction_serialization() {
        let found = serde_json::to_value(Extraction::Found(json!(["Lisinopril"]))).unwrap();
        assert_eq!(found, json!({"status": "found", "value": ["Lisinopril"]}));

        let missing = serde_json::to_value(Extraction::NotFound).unwrap();
        assert_eq!(missing, json!({"status": "not_found"}));
    }
}
