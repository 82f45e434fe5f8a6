//! Customer -> intent -> confirmation sequencing.

use std::sync::Arc;

use tracing::{info, warn};

use super::customer::{Customer, NewCustomer};
use super::intent::{IntentDraft, PaymentIntent, QuoteMetadata};
use super::ledger::PaymentLedgerAdapter;
use crate::billing::{BillingCalculator, BillingQuote};
use crate::types::AnalysisTier;
use crate::{Error, Result};

/// Drives the processor through the payment lifecycle. Amounts always come
/// from the local [`BillingCalculator`]; nothing is retried.
#[derive(Debug, Clone)]
pub struct PaymentWorkflow {
    ledger: Arc<dyn PaymentLedgerAdapter>,
    calculator: BillingCalculator,
}

impl PaymentWorkflow {
    pub fn new(ledger: Arc<dyn PaymentLedgerAdapter>, calculator: BillingCalculator) -> Self {
        Self { ledger, calculator }
    }

    pub fn ledger(&self) -> &dyn PaymentLedgerAdapter {
        self.ledger.as_ref()
    }

    pub fn calculator(&self) -> &BillingCalculator {
        &self.calculator
    }

    #[tracing::instrument(skip_all)]
    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer> {
        let created = self.ledger.create_customer(customer).await?;
        info!(
            customer_id = %created.customer_id,
            enterprise = created.is_enterprise,
            "customer created"
        );
        Ok(created)
    }

    /// Read-through: customer plus recent payment history.
    #[tracing::instrument(skip(self))]
    pub async fn get_customer_info(&self, customer_id: &str) -> Result<Customer> {
        let mut customer = self.ledger.get_customer(customer_id).await?;
        customer.history = self.ledger.list_payments(customer_id).await?;
        Ok(customer)
    }

    /// Quote for an existing customer, reading the enterprise flag from the ledger.
    pub async fn quote_for_customer(
        &self,
        customer_id: &str,
        tier: AnalysisTier,
        document_count: i64,
    ) -> Result<(BillingQuote, bool)> {
        // Reject bad quantities before touching the processor.
        self.calculator.quote(tier, document_count, false)?;
        let customer = self.ledger.get_customer(customer_id).await?;
        let quote = self
            .calculator
            .quote(tier, document_count, customer.is_enterprise)?;
        Ok((quote, customer.is_enterprise))
    }

    #[tracing::instrument(skip(self), fields(tier = %tier))]
    pub async fn create_intent(
        &self,
        customer_id: &str,
        tier: AnalysisTier,
        document_count: i64,
    ) -> Result<PaymentIntent> {
        let (quote, is_enterprise) = self
            .quote_for_customer(customer_id, tier, document_count)
            .await?;

        let draft = IntentDraft {
            customer_id: customer_id.to_string(),
            amount_minor: quote.amount_minor,
            currency: quote.currency.clone(),
            quote: QuoteMetadata {
                tier,
                document_count,
                is_enterprise,
            },
            description: format!("Medical analysis: {} x{}", tier, document_count),
        };

        let intent = self.ledger.create_intent(&draft).await?;
        if intent.amount_minor != quote.amount_minor
            || !intent.currency.eq_ignore_ascii_case(&quote.currency)
        {
            warn!(
                intent_id = %intent.intent_id,
                "processor recorded a different amount than quoted"
            );
            return Err(Error::AmountMismatch {
                intent_id: intent.intent_id,
                expected_minor: quote.amount_minor,
                actual_minor: intent.amount_minor,
            });
        }

        info!(intent_id = %intent.intent_id, amount_minor = intent.amount_minor, "intent created");
        Ok(intent)
    }

    /// Confirm an intent. Settled intents are returned as-is; the amount is
    /// re-derived from the intent's quote metadata before any money moves.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        let current = self.ledger.get_intent(intent_id).await?;
        if current.status.is_settled() {
            info!(status = %current.status, "intent already settled");
            return Ok(current);
        }

        let meta = current.quote.ok_or_else(|| Error::UnrecognizedIntent {
            intent_id: current.intent_id.clone(),
        })?;
        let expected = self
            .calculator
            .quote(meta.tier, meta.document_count, meta.is_enterprise)?;
        if expected.amount_minor != current.amount_minor
            || !expected.currency.eq_ignore_ascii_case(&current.currency)
        {
            warn!("intent amount does not match its quote; refusing to confirm");
            return Err(Error::AmountMismatch {
                intent_id: current.intent_id,
                expected_minor: expected.amount_minor,
                actual_minor: current.amount_minor,
            });
        }

        let confirmed = self.ledger.confirm_intent(intent_id).await?;
        info!(status = %confirmed.status, "intent confirmed");
        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::IntentStatus;
    use crate::testing::ScriptedLedger;

    fn workflow(ledger: &Arc<ScriptedLedger>) -> PaymentWorkflow {
        PaymentWorkflow::new(ledger.clone(), BillingCalculator::default())
    }

    #[tokio::test]
    async fn test_intent_amount_comes_from_quote() {
        let ledger = Arc::new(ScriptedLedger::new());
        let customer = ledger.add_customer("ops@clinic.example", true);

        let intent = workflow(&ledger)
            .create_intent(&customer, AnalysisTier::Basic, 12)
            .await
            .unwrap();

        assert_eq!(intent.amount_minor, 90);
        assert_eq!(intent.status, IntentStatus::Created);
        let meta = intent.quote.unwrap();
        assert!(meta.is_enterprise);
        assert_eq!(meta.document_count, 12);
    }

    #[tokio::test]
    async fn test_invalid_quantity_never_reaches_ledger() {
        let ledger = Arc::new(ScriptedLedger::new());
        let customer = ledger.add_customer("a@b.example", false);

        let err = workflow(&ledger)
            .create_intent(&customer, AnalysisTier::Basic, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidQuantity { count: 0 }));
        assert_eq!(ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn test_confirm_success_and_decline() {
        let ledger = Arc::new(ScriptedLedger::new());
        let customer = ledger.add_customer("a@b.example", false);
        let wf = workflow(&ledger);

        let intent = wf.create_intent(&customer, AnalysisTier::Comprehensive, 10).await.unwrap();
        let confirmed = wf.confirm_intent(&intent.intent_id).await.unwrap();
        assert_eq!(confirmed.status, IntentStatus::Succeeded);

        ledger.decline_next_confirmation();
        let intent = wf.create_intent(&customer, AnalysisTier::Basic, 1).await.unwrap();
        let failed = wf.confirm_intent(&intent.intent_id).await.unwrap();
        assert_eq!(failed.status, IntentStatus::Failed);
    }

    #[tokio::test]
    async fn test_settled_intent_is_not_confirmed_twice() {
        let ledger = Arc::new(ScriptedLedger::new());
        let customer = ledger.add_customer("a@b.example", false);
        let wf = workflow(&ledger);

        let intent = wf.create_intent(&customer, AnalysisTier::Batch, 3).await.unwrap();
        wf.confirm_intent(&intent.intent_id).await.unwrap();
        let again = wf.confirm_intent(&intent.intent_id).await.unwrap();

        assert_eq!(again.status, IntentStatus::Succeeded);
        assert_eq!(ledger.confirm_count(), 1);
    }

    #[tokio::test]
    async fn test_tampered_amount_aborts_before_confirmation() {
        let ledger = Arc::new(ScriptedLedger::new());
        let customer = ledger.add_customer("a@b.example", false);
        let wf = workflow(&ledger);

        let intent = wf.create_intent(&customer, AnalysisTier::Complicated, 2).await.unwrap();
        ledger.set_amount(&intent.intent_id, 1);

        let err = wf.confirm_intent(&intent.intent_id).await.unwrap_err();
        assert!(matches!(err, Error::AmountMismatch { expected_minor: 150, actual_minor: 1, .. }));
        assert_eq!(ledger.confirm_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_intent_is_refused() {
        let ledger = Arc::new(ScriptedLedger::new());
        let id = ledger.add_foreign_intent(500);

        let err = workflow(&ledger).confirm_intent(&id).await.unwrap_err();
        assert!(matches!(err, Error::UnrecognizedIntent { .. }));
        assert_eq!(ledger.confirm_count(), 0);
    }

    #[tokio::test]
    async fn test_customer_info_includes_history() {
        let ledger = Arc::new(ScriptedLedger::new());
        let customer = ledger.add_customer("a@b.example", false);
        let wf = workflow(&ledger);
        let intent = wf.create_intent(&customer, AnalysisTier::Basic, 2).await.unwrap();

        let info = wf.get_customer_info(&customer).await.unwrap();
        assert_eq!(info.history.len(), 1);
        assert_eq!(info.history[0].intent_id, intent.intent_id);
    }

    #[tokio::test]
    async fn test_unknown_customer() {
        let ledger = Arc::new(ScriptedLedger::new());
        let err = workflow(&ledger)
            .create_intent("cus_nobody", AnalysisTier::Basic, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CustomerNotFound { .. }));
    }
}
