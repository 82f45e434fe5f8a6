use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intent::IntentStatus;
use crate::types::AnalysisTier;

/// A billing customer as held by the processor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_enterprise: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Most recent intents first. Empty unless fetched with history.
    #[serde(default)]
    pub history: Vec<PaymentRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub intent_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: IntentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<AnalysisTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCustomer {
    pub email: String,
    pub name: Option<String>,
    pub is_enterprise: bool,
}

impl NewCustomer {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            is_enterprise: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn enterprise(mut self, is_enterprise: bool) -> Self {
        self.is_enterprise = is_enterprise;
        self
    }
}
