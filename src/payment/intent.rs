//! Payment intents and their quote metadata.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::AnalysisTier;

/// Intent lifecycle: `created -> confirmed -> {succeeded, failed}`.
/// Transitions come only from ledger responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    Created,
    Confirmed,
    Succeeded,
    Failed,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Confirmed => "confirmed",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Succeeded and failed are terminal.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quote inputs stored on the intent so its amount can be recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteMetadata {
    pub tier: AnalysisTier,
    pub document_count: i64,
    pub is_enterprise: bool,
}

pub const META_ANALYSIS_TYPE: &str = "analysis_type";
pub const META_DOCUMENT_COUNT: &str = "document_count";
pub const META_ENTERPRISE: &str = "is_enterprise";
pub const META_SERVICE: &str = "service";
pub const SERVICE_TAG: &str = "medical_analysis";

impl QuoteMetadata {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (META_ANALYSIS_TYPE, self.tier.to_string()),
            (META_DOCUMENT_COUNT, self.document_count.to_string()),
            (META_ENTERPRISE, self.is_enterprise.to_string()),
            (META_SERVICE, SERVICE_TAG.to_string()),
        ]
    }

    /// `None` unless every field is present and well-formed.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Option<Self> {
        if metadata.get(META_SERVICE).map(String::as_str) != Some(SERVICE_TAG) {
            return None;
        }
        Some(Self {
            tier: metadata.get(META_ANALYSIS_TYPE)?.parse().ok()?,
            document_count: metadata.get(META_DOCUMENT_COUNT)?.parse().ok()?,
            is_enterprise: metadata.get(META_ENTERPRISE)?.parse().ok()?,
        })
    }
}

/// What the workflow asks the ledger to create.
#[derive(Clone, Debug, PartialEq)]
pub struct IntentDraft {
    pub customer_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub quote: QuoteMetadata,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub customer_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: IntentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PaymentIntent {
    /// Amount in major units, assuming a two-decimal currency.
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.amount_minor, 2)
    }

    pub fn with_status(mut self, status: IntentStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metadata_roundtrip_through_processor_map() {
        let meta = QuoteMetadata {
            tier: AnalysisTier::Complicated,
            document_count: 3,
            is_enterprise: true,
        };
        let map: HashMap<String, String> = meta
            .to_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(QuoteMetadata::from_metadata(&map), Some(meta));
    }

    #[test]
    fn test_foreign_metadata_is_unrecognized() {
        let mut map = HashMap::new();
        map.insert(META_ANALYSIS_TYPE.to_string(), "basic".to_string());
        map.insert(META_DOCUMENT_COUNT.to_string(), "1".to_string());
        map.insert(META_ENTERPRISE.to_string(), "false".to_string());
        assert_eq!(QuoteMetadata::from_metadata(&map), None);

        map.insert(META_SERVICE.to_string(), SERVICE_TAG.to_string());
        map.insert(META_DOCUMENT_COUNT.to_string(), "many".to_string());
        assert_eq!(QuoteMetadata::from_metadata(&map), None);
    }

    #[test]
    fn test_amount_and_settled() {
        let intent = PaymentIntent {
            intent_id: "pi_1".into(),
            customer_id: Some("cus_1".into()),
            amount_minor: 90,
            currency: "usd".into(),
            status: IntentStatus::Created,
            quote: None,
            created_at: None,
        };
        assert_eq!(intent.amount(), dec!(0.90));
        assert!(!intent.status.is_settled());
        assert!(intent.with_status(IntentStatus::Failed).status.is_settled());
    }
}
