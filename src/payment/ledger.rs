//! Payment processor adapter trait.

use std::fmt::Debug;

use async_trait::async_trait;

use super::customer::{Customer, NewCustomer, PaymentRecord};
use super::error::{LedgerError, LedgerOperation, LedgerResult};
use super::intent::{IntentDraft, PaymentIntent};

/// Uniform interface over the payment processor. The processor owns all
/// customer and intent state; implementations hold none and never retry.
#[async_trait]
pub trait PaymentLedgerAdapter: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn is_configured(&self) -> bool {
        true
    }

    /// Fails with a `Conflict` error carrying the existing id when the email
    /// is already registered.
    async fn create_customer(&self, customer: &NewCustomer) -> LedgerResult<Customer>;

    /// The customer without payment history.
    async fn get_customer(&self, customer_id: &str) -> LedgerResult<Customer>;

    async fn list_payments(&self, customer_id: &str) -> LedgerResult<Vec<PaymentRecord>>;

    async fn create_intent(&self, draft: &IntentDraft) -> LedgerResult<PaymentIntent>;

    async fn get_intent(&self, intent_id: &str) -> LedgerResult<PaymentIntent>;

    async fn confirm_intent(&self, intent_id: &str) -> LedgerResult<PaymentIntent>;
}

/// Stand-in used when no processor credential is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredLedger;

impl UnconfiguredLedger {
    fn refuse<T>(operation: LedgerOperation) -> LedgerResult<T> {
        Err(LedgerError::unavailable(
            operation,
            "payment processor credential not configured",
        ))
    }
}

#[async_trait]
impl PaymentLedgerAdapter for UnconfiguredLedger {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn create_customer(&self, _customer: &NewCustomer) -> LedgerResult<Customer> {
        Self::refuse(LedgerOperation::CreateCustomer)
    }

    async fn get_customer(&self, _customer_id: &str) -> LedgerResult<Customer> {
        Self::refuse(LedgerOperation::GetCustomer)
    }

    async fn list_payments(&self, _customer_id: &str) -> LedgerResult<Vec<PaymentRecord>> {
        Self::refuse(LedgerOperation::ListPayments)
    }

    async fn create_intent(&self, _draft: &IntentDraft) -> LedgerResult<PaymentIntent> {
        Self::refuse(LedgerOperation::CreateIntent)
    }

    async fn get_intent(&self, _intent_id: &str) -> LedgerResult<PaymentIntent> {
        Self::refuse(LedgerOperation::GetIntent)
    }

    async fn confirm_intent(&self, _intent_id: &str) -> LedgerResult<PaymentIntent> {
        Self::refuse(LedgerOperation::ConfirmIntent)
    }
}
