//! Customer and payment intent tools.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{SchemaTool, default_analysis_type, default_document_count};
use crate::payment::NewCustomer;
use crate::service::MedicalAgent;
use crate::types::ToolOutput;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateCustomerInput {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Enterprise customers receive the enterprise discount on every quote.
    #[serde(default)]
    pub is_enterprise: bool,
}

pub struct CreateCustomerTool {
    agent: Arc<MedicalAgent>,
}

impl CreateCustomerTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for CreateCustomerTool {
    type Input = CreateCustomerInput;

    const NAME: &'static str = "create_customer";
    const DESCRIPTION: &'static str = "Register a billing customer with the payment \
        processor. Fails if a customer with the same email already exists.";

    async fn handle(&self, input: CreateCustomerInput) -> ToolOutput {
        let email = input.email.trim();
        if !email.contains('@') {
            return ToolOutput::invalid_input("email must be an email address");
        }
        let mut customer = NewCustomer::new(email).enterprise(input.is_enterprise);
        if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
            customer = customer.with_name(name);
        }
        self.agent.create_customer(&customer).await.into()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CustomerInfoInput {
    pub customer_id: String,
}

pub struct CustomerInfoTool {
    agent: Arc<MedicalAgent>,
}

impl CustomerInfoTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for CustomerInfoTool {
    type Input = CustomerInfoInput;

    const NAME: &'static str = "get_customer_info";
    const DESCRIPTION: &'static str = "Fetch a customer and their ten most recent payment \
        intents from the payment processor.";

    async fn handle(&self, input: CustomerInfoInput) -> ToolOutput {
        self.agent.get_customer_info(&input.customer_id).await.into()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePaymentIntentInput {
    pub customer_id: String,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
    #[serde(default = "default_document_count")]
    pub document_count: i64,
}

pub struct CreatePaymentIntentTool {
    agent: Arc<MedicalAgent>,
}

impl CreatePaymentIntentTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for CreatePaymentIntentTool {
    type Input = CreatePaymentIntentInput;

    const NAME: &'static str = "create_payment_intent";
    const DESCRIPTION: &'static str = "Create a payment intent for analyzing document_count \
        documents at a tier. The amount is computed by the service, including the \
        customer's discounts.";

    async fn handle(&self, input: CreatePaymentIntentInput) -> ToolOutput {
        self.agent
            .create_payment_intent(&input.customer_id, &input.analysis_type, input.document_count)
            .await
            .into()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConfirmPaymentInput {
    #[serde(alias = "payment_intent_id")]
    pub intent_id: String,
}

pub struct ConfirmPaymentTool {
    agent: Arc<MedicalAgent>,
}

impl ConfirmPaymentTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for ConfirmPaymentTool {
    type Input = ConfirmPaymentInput;

    const NAME: &'static str = "confirm_payment";
    const DESCRIPTION: &'static str = "Confirm a payment intent created by this service. \
        Returns the settled status; a failed payment is final and is not retried.";

    async fn handle(&self, input: ConfirmPaymentInput) -> ToolOutput {
        self.agent.confirm_payment(&input.intent_id).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;
    use crate::tools::testing::agent;
    use serde_json::json;

    #[tokio::test]
    async fn test_customer_lifecycle() {
        let (agent, _, _) = agent();

        let created = CreateCustomerTool::new(agent.clone())
            .execute(json!({
                "email": "billing@clinic.example",
                "name": "Clinic",
                "is_enterprise": true
            }))
            .await;
        assert!(!created.is_error());
        let customer_id = created.payload()["customer_id"].as_str().unwrap().to_string();

        let duplicate = CreateCustomerTool::new(agent.clone())
            .execute(json!({"email": "billing@clinic.example"}))
            .await;
        assert_eq!(duplicate.payload()["error"]["kind"], "duplicate_customer");
        assert_eq!(duplicate.payload()["error"]["customer_id"], customer_id.as_str());

        let intent = CreatePaymentIntentTool::new(agent.clone())
            .execute(json!({
                "customer_id": customer_id,
                "analysis_type": "basic",
                "document_count": 12
            }))
            .await;
        assert_eq!(intent.payload()["amount_minor"], 90);
        assert_eq!(intent.payload()["status"], "created");
        let intent_id = intent.payload()["intent_id"].as_str().unwrap().to_string();

        let confirmed = ConfirmPaymentTool::new(agent.clone())
            .execute(json!({"payment_intent_id": intent_id}))
            .await;
        assert_eq!(confirmed.payload()["status"], "succeeded");

        let info = CustomerInfoTool::new(agent)
            .execute(json!({"customer_id": customer_id}))
            .await;
        assert_eq!(info.payload()["is_enterprise"], true);
        assert_eq!(info.payload()["history"][0]["status"], "succeeded");
    }

    #[tokio::test]
    async fn test_create_customer_requires_email_shape() {
        let (agent, ledger, _) = agent();
        let output = CreateCustomerTool::new(agent)
            .execute(json!({"email": "not-an-email"}))
            .await;
        assert_eq!(output.payload()["error"]["kind"], "invalid_input");
        assert_eq!(ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn test_confirm_unknown_intent() {
        let (agent, _, _) = agent();
        let output = ConfirmPaymentTool::new(agent)
            .execute(json!({"intent_id": "pi_missing"}))
            .await;
        assert_eq!(output.payload()["error"]["kind"], "intent_not_found");
        assert_eq!(output.payload()["error"]["retryable"], false);
    }
}
