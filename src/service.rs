//! Composition root shared by the tools.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::analysis::AnalysisDispatcher;
use crate::billing::{BillingCalculator, BillingQuote, unit_price};
use crate::client::{
    AnthropicAdapter, OpenAiAdapter, ProviderAdapter, ProviderConfig, UnconfiguredAdapter,
};
use crate::config::Settings;
use crate::gate::ExecutionGate;
use crate::observability::SERVICE_NAME_DEFAULT;
use crate::patients::{PatientDirectory, PatientSummary, SampleDirectory};
use crate::payment::{
    Customer, NewCustomer, PaymentIntent, PaymentLedgerAdapter, PaymentWorkflow, StripeConfig,
    StripeLedger, UnconfiguredLedger,
};
use crate::tools::TOOL_NAMES;
use crate::types::{AnalysisRequest, AnalysisResult, AnalysisTier};
use crate::Result;

const SUPPORTED_DOCUMENT_TYPES: &[&str] = &[
    "SOAP notes",
    "Lab reports",
    "Prescription summaries",
    "Patient histories",
    "Discharge summaries",
];

#[derive(Debug, Clone, Serialize)]
pub struct ServiceOffering {
    pub tier: AnalysisTier,
    pub price: Decimal,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub token_budget: u32,
    pub response_shape: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscountTerms {
    pub volume_threshold: i64,
    pub volume_rate: Decimal,
    pub enterprise_rate: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceCatalog {
    pub name: &'static str,
    pub version: &'static str,
    pub currency: String,
    pub tiers: Vec<ServiceOffering>,
    pub discounts: DiscountTerms,
    pub supported_document_types: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorStatus {
    pub name: String,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `ok` when every collaborator is configured, otherwise `degraded`.
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub primary_provider: CollaboratorStatus,
    pub fallback_provider: CollaboratorStatus,
    pub payment_processor: CollaboratorStatus,
    pub patient_directory: CollaboratorStatus,
    pub tools: Vec<&'static str>,
    pub tiers: Vec<&'static str>,
}

/// Owns one instance of every component. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct MedicalAgent {
    dispatcher: Arc<AnalysisDispatcher>,
    workflow: Arc<PaymentWorkflow>,
    gate: ExecutionGate,
    patients: Arc<dyn PatientDirectory>,
}

impl MedicalAgent {
    pub fn new(
        dispatcher: AnalysisDispatcher,
        workflow: PaymentWorkflow,
        patients: Arc<dyn PatientDirectory>,
    ) -> Self {
        let dispatcher = Arc::new(dispatcher);
        let workflow = Arc::new(workflow);
        Self {
            gate: ExecutionGate::new(workflow.clone(), dispatcher.clone()),
            dispatcher,
            workflow,
            patients,
        }
    }

    /// Wire real adapters from settings. Missing credentials yield stand-ins
    /// that fail their calls as unavailable.
    pub fn from_settings(settings: &Settings) -> Self {
        let anthropic_config = ProviderConfig::new(
            settings.anthropic.model.clone(),
            settings.anthropic.base_url.clone(),
        )
        .with_timeout(settings.provider_timeout);
        let primary: Arc<dyn ProviderAdapter> = match &settings.anthropic.api_key {
            Some(key) => Arc::new(AnthropicAdapter::new(anthropic_config, key.clone())),
            None => Arc::new(UnconfiguredAdapter::new("anthropic", anthropic_config)),
        };

        let openai_config =
            ProviderConfig::new(settings.openai.model.clone(), settings.openai.base_url.clone())
                .with_timeout(settings.provider_timeout);
        let fallback: Arc<dyn ProviderAdapter> = match &settings.openai.api_key {
            Some(key) => Arc::new(OpenAiAdapter::new(openai_config, key.clone())),
            None => Arc::new(UnconfiguredAdapter::new("openai", openai_config)),
        };

        let ledger: Arc<dyn PaymentLedgerAdapter> = match &settings.ledger.api_key {
            Some(key) => {
                let mut config = StripeConfig::default()
                    .with_base_url(settings.ledger.base_url.clone())
                    .with_timeout(settings.ledger.timeout);
                if let Some(method) = &settings.ledger.payment_method {
                    config = config.with_payment_method(method.clone());
                }
                Arc::new(StripeLedger::new(config, key.clone()))
            }
            None => Arc::new(UnconfiguredLedger),
        };

        info!(
            primary = primary.name(),
            primary_configured = primary.is_configured(),
            fallback = fallback.name(),
            fallback_configured = fallback.is_configured(),
            ledger_configured = ledger.is_configured(),
            "medical agent assembled"
        );

        let dispatcher = AnalysisDispatcher::new(primary, fallback)
            .with_max_document_bytes(settings.max_document_bytes);
        let workflow = PaymentWorkflow::new(
            ledger,
            BillingCalculator::new(settings.ledger.currency.clone()),
        );
        Self::new(dispatcher, workflow, Arc::new(SampleDirectory::new()))
    }

    pub fn dispatcher(&self) -> &AnalysisDispatcher {
        &self.dispatcher
    }

    pub fn workflow(&self) -> &PaymentWorkflow {
        &self.workflow
    }

    pub fn gate(&self) -> &ExecutionGate {
        &self.gate
    }

    pub fn patients(&self) -> &dyn PatientDirectory {
        self.patients.as_ref()
    }

    /// Unpaid analysis.
    pub async fn analyze(
        &self,
        document_content: &str,
        tier: &str,
        patient_id: Option<&str>,
    ) -> Result<AnalysisResult> {
        let tier: AnalysisTier = tier.parse()?;
        let mut request = AnalysisRequest::new(document_content, tier);
        if let Some(patient_id) = patient_id {
            request = request.with_patient_id(patient_id);
        }
        self.dispatcher.analyze(&request).await
    }

    pub async fn patient_summary(&self, patient_id: &str) -> Result<PatientSummary> {
        self.patients.get_summary(patient_id).await
    }

    pub fn calculate_billing(
        &self,
        tier: &str,
        document_count: i64,
        is_enterprise: bool,
    ) -> Result<BillingQuote> {
        let tier: AnalysisTier = tier.parse()?;
        self.workflow
            .calculator()
            .quote(tier, document_count, is_enterprise)
    }

    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer> {
        self.workflow.create_customer(customer).await
    }

    pub async fn create_payment_intent(
        &self,
        customer_id: &str,
        tier: &str,
        document_count: i64,
    ) -> Result<PaymentIntent> {
        let tier: AnalysisTier = tier.parse()?;
        self.workflow
            .create_intent(customer_id, tier, document_count)
            .await
    }

    pub async fn confirm_payment(&self, intent_id: &str) -> Result<PaymentIntent> {
        self.workflow.confirm_intent(intent_id).await
    }

    pub async fn get_customer_info(&self, customer_id: &str) -> Result<Customer> {
        self.workflow.get_customer_info(customer_id).await
    }

    pub async fn process_paid_analysis(
        &self,
        customer_id: &str,
        document_content: &str,
        tier: &str,
        document_count: i64,
        patient_id: Option<&str>,
    ) -> Result<AnalysisResult> {
        self.gate
            .process_paid_analysis(customer_id, document_content, tier, document_count, patient_id)
            .await
    }

    pub fn services(&self) -> ServiceCatalog {
        let calculator = self.workflow.calculator();
        let policy = calculator.policy();
        ServiceCatalog {
            name: SERVICE_NAME_DEFAULT,
            version: env!("CARGO_PKG_VERSION"),
            currency: calculator.currency().to_string(),
            tiers: self
                .dispatcher
                .catalog()
                .all()
                .map(|spec| ServiceOffering {
                    tier: spec.tier,
                    price: unit_price(spec.tier),
                    description: spec.description,
                    features: spec.features,
                    token_budget: spec.token_budget,
                    response_shape: spec.response_shape,
                })
                .collect(),
            discounts: DiscountTerms {
                volume_threshold: policy.volume_threshold,
                volume_rate: policy.volume_rate,
                enterprise_rate: policy.enterprise_rate,
            },
            supported_document_types: SUPPORTED_DOCUMENT_TYPES,
        }
    }

    pub fn health(&self) -> HealthReport {
        let primary = self.dispatcher.primary();
        let fallback = self.dispatcher.fallback();
        let ledger = self.workflow.ledger();

        let provider_status = |adapter: &dyn ProviderAdapter| CollaboratorStatus {
            name: adapter.name().to_string(),
            configured: adapter.is_configured(),
            model: Some(adapter.model().to_string()),
        };
        let primary_provider = provider_status(primary);
        let fallback_provider = provider_status(fallback);
        let payment_processor = CollaboratorStatus {
            name: ledger.name().to_string(),
            configured: ledger.is_configured(),
            model: None,
        };

        let all_configured = primary_provider.configured
            && fallback_provider.configured
            && payment_processor.configured;

        HealthReport {
            status: if all_configured { "ok" } else { "degraded" },
            service: SERVICE_NAME_DEFAULT,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            primary_provider,
            fallback_provider,
            payment_processor,
            patient_directory: CollaboratorStatus {
                name: self.patients.name().to_string(),
                configured: true,
                model: None,
            },
            tools: TOOL_NAMES.to_vec(),
            tiers: AnalysisTier::names(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfigProvider, keys};
    use rust_decimal_macros::dec;

    async fn unconfigured() -> MedicalAgent {
        let settings = Settings::load(&MemoryConfigProvider::new()).await.unwrap();
        MedicalAgent::from_settings(&settings)
    }

    #[tokio::test]
    async fn test_health_reports_missing_credentials() {
        let health = unconfigured().await.health();
        assert_eq!(health.status, "degraded");
        assert!(!health.primary_provider.configured);
        assert!(!health.payment_processor.configured);
        assert_eq!(health.tools.len(), 10);
        assert_eq!(health.tiers, vec!["basic", "comprehensive", "batch", "complicated"]);
    }

    #[tokio::test]
    async fn test_health_with_all_credentials() {
        let provider = MemoryConfigProvider::new()
            .value(keys::ANTHROPIC_API_KEY, "sk-ant-test")
            .value(keys::OPENAI_API_KEY, "sk-test")
            .value(keys::STRIPE_API_KEY, "sk_test_123");
        let settings = Settings::load(&provider).await.unwrap();
        let health = MedicalAgent::from_settings(&settings).health();
        assert_eq!(health.status, "ok");
        assert_eq!(health.payment_processor.name, "stripe");
        assert_eq!(health.fallback_provider.model.as_deref(), Some("gpt-4o"));
    }

    #[tokio::test]
    async fn test_services_catalog() {
        let catalog = unconfigured().await.services();
        assert_eq!(catalog.tiers.len(), 4);
        let complicated = catalog
            .tiers
            .iter()
            .find(|t| t.tier == AnalysisTier::Complicated)
            .unwrap();
        assert_eq!(complicated.price, dec!(0.75));
        assert_eq!(complicated.token_budget, 8192);
        assert_eq!(catalog.discounts.enterprise_rate, dec!(0.15));
    }

    #[tokio::test]
    async fn test_calculate_billing_by_name() {
        let agent = unconfigured().await;
        let quote = agent.calculate_billing("comprehensive", 10, true).unwrap();
        assert_eq!(quote.total_amount, dec!(3.75));
        assert!(agent.calculate_billing("platinum", 1, false).is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_ledger_surfaces_unavailable() {
        let err = unconfigured()
            .await
            .create_customer(&NewCustomer::new("a@b.example"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ledger_unavailable");
        assert_eq!(err.collaborator(), "payment_processor");
    }
}
