//! Pricing, service catalog and health tools.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{SchemaTool, default_analysis_type, default_document_count};
use crate::service::MedicalAgent;
use crate::types::ToolOutput;

/// Input for tools that take no arguments.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoInput {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalculateBillingInput {
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
    #[serde(default = "default_document_count")]
    pub document_count: i64,
    /// Apply the enterprise discount.
    #[serde(default)]
    pub is_enterprise: bool,
}

pub struct CalculateBillingTool {
    agent: Arc<MedicalAgent>,
}

impl CalculateBillingTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for CalculateBillingTool {
    type Input = CalculateBillingInput;

    const NAME: &'static str = "calculate_billing";
    const DESCRIPTION: &'static str = "Quote the price of analyzing document_count documents \
        at a tier. Ten or more documents earn a volume discount; enterprise customers earn \
        an additional discount. No payment is created.";

    async fn handle(&self, input: CalculateBillingInput) -> ToolOutput {
        self.agent
            .calculate_billing(&input.analysis_type, input.document_count, input.is_enterprise)
            .into()
    }
}

pub struct ServicesTool {
    agent: Arc<MedicalAgent>,
}

impl ServicesTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for ServicesTool {
    type Input = NoInput;

    const NAME: &'static str = "get_available_services";
    const DESCRIPTION: &'static str = "List analysis tiers with per-document price, \
        description, features and discount terms.";

    async fn handle(&self, _input: NoInput) -> ToolOutput {
        ToolOutput::success(&self.agent.services())
    }
}

pub struct HealthCheckTool {
    agent: Arc<MedicalAgent>,
}

impl HealthCheckTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for HealthCheckTool {
    type Input = NoInput;

    const NAME: &'static str = "health_check";
    const DESCRIPTION: &'static str = "Report service version, which collaborators are \
        configured, and the available tools and tiers.";

    async fn handle(&self, _input: NoInput) -> ToolOutput {
        ToolOutput::success(&self.agent.health())
    }
}
