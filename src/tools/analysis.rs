//! Document analysis and patient lookup tools.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{SchemaTool, default_analysis_type, default_document_count};
use crate::service::MedicalAgent;
use crate::types::ToolOutput;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeDocumentInput {
    /// Full text of the medical document.
    pub document_content: String,
    /// One of basic, comprehensive, batch, complicated.
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
    /// Opaque patient identifier echoed in the result.
    #[serde(default)]
    pub patient_id: Option<String>,
}

/// Unpaid analysis of a single document.
pub struct AnalyzeDocumentTool {
    agent: Arc<MedicalAgent>,
}

impl AnalyzeDocumentTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for AnalyzeDocumentTool {
    type Input = AnalyzeDocumentInput;

    const NAME: &'static str = "analyze_medical_document";
    const DESCRIPTION: &'static str = "Analyze a medical document and extract structured \
        information. The analysis type selects the prompt, token budget and the set of \
        categories returned; categories absent from the document are marked not found.";

    async fn handle(&self, input: AnalyzeDocumentInput) -> ToolOutput {
        self.agent
            .analyze(
                &input.document_content,
                &input.analysis_type,
                input.patient_id.as_deref(),
            )
            .await
            .into()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PaidAnalysisInput {
    /// Processor customer id, e.g. `cus_...`.
    pub customer_id: String,
    /// Full text of the medical document.
    pub document_content: String,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
    /// Number of documents billed.
    #[serde(default = "default_document_count")]
    pub document_count: i64,
    #[serde(default)]
    pub patient_id: Option<String>,
}

/// Charge first, then analyze. Analysis never runs on an unsettled payment.
pub struct PaidAnalysisTool {
    agent: Arc<MedicalAgent>,
}

impl PaidAnalysisTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for PaidAnalysisTool {
    type Input = PaidAnalysisInput;

    const NAME: &'static str = "process_paid_analysis";
    const DESCRIPTION: &'static str = "Quote, create and confirm a payment for the customer, \
        then analyze the document. If the payment does not succeed the document is not \
        analyzed. The result carries the settled payment intent.";

    async fn handle(&self, input: PaidAnalysisInput) -> ToolOutput {
        self.agent
            .process_paid_analysis(
                &input.customer_id,
                &input.document_content,
                &input.analysis_type,
                input.document_count,
                input.patient_id.as_deref(),
            )
            .await
            .into()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PatientSummaryInput {
    pub patient_id: String,
}

pub struct PatientSummaryTool {
    agent: Arc<MedicalAgent>,
}

impl PatientSummaryTool {
    pub fn new(agent: Arc<MedicalAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SchemaTool for PatientSummaryTool {
    type Input = PatientSummaryInput;

    const NAME: &'static str = "get_patient_summary";
    const DESCRIPTION: &'static str = "Retrieve a patient summary: demographics, current \
        conditions, active medication count, last visit and last recorded vital signs.";

    async fn handle(&self, input: PatientSummaryInput) -> ToolOutput {
        self.agent.patient_summary(&input.patient_id).await.into()
    }
}
