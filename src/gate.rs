//! Paid analysis: quote, intent, confirm, analyze.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::AnalysisDispatcher;
use crate::payment::{IntentStatus, PaymentWorkflow};
use crate::types::{AnalysisRequest, AnalysisResult, AnalysisTier, PaymentReceipt};
use crate::{Error, Result};

/// Runs analysis only after the processor reports a succeeded payment.
///
/// Every step is awaited before the next starts. Local validation runs
/// first so bad input never creates an intent.
#[derive(Debug, Clone)]
pub struct ExecutionGate {
    workflow: Arc<PaymentWorkflow>,
    dispatcher: Arc<AnalysisDispatcher>,
}

impl ExecutionGate {
    pub fn new(workflow: Arc<PaymentWorkflow>, dispatcher: Arc<AnalysisDispatcher>) -> Self {
        Self {
            workflow,
            dispatcher,
        }
    }

    #[tracing::instrument(skip(self, document_content, patient_id))]
    pub async fn process_paid_analysis(
        &self,
        customer_id: &str,
        document_content: &str,
        tier: &str,
        document_count: i64,
        patient_id: Option<&str>,
    ) -> Result<AnalysisResult> {
        let tier: AnalysisTier = tier.parse()?;
        self.workflow
            .calculator()
            .quote(tier, document_count, false)?;
        self.dispatcher.validate_document(document_content)?;

        let intent = self
            .workflow
            .create_intent(customer_id, tier, document_count)
            .await?;
        let settled = self.workflow.confirm_intent(&intent.intent_id).await?;

        if settled.status != IntentStatus::Succeeded {
            warn!(
                intent_id = %settled.intent_id,
                status = %settled.status,
                "payment not settled; analysis skipped"
            );
            return Err(Error::PaymentRequired {
                intent_id: settled.intent_id,
                status: settled.status,
            });
        }

        let mut request = AnalysisRequest::new(document_content, tier);
        if let Some(patient_id) = patient_id {
            request = request.with_patient_id(patient_id);
        }

        let receipt = PaymentReceipt {
            intent_id: settled.intent_id.clone(),
            amount: settled.amount(),
            amount_minor: settled.amount_minor,
            currency: settled.currency.clone(),
        };

        match self.dispatcher.analyze(&request).await {
            Ok(result) => {
                info!(intent_id = %receipt.intent_id, "paid analysis complete");
                Ok(result.with_payment(receipt))
            }
            Err(err) => {
                warn!(
                    intent_id = %receipt.intent_id,
                    kind = err.kind(),
                    "analysis failed after payment"
                );
                Err(Error::PaidAnalysisFailed {
                    intent_id: receipt.intent_id,
                    source: Box::new(err),
                })
            }
        }
    }
}
