//! Tier -> prompt, response shape and token budget.

use serde::Serialize;

use super::templates::{BASIC_PROMPT, BATCH_PROMPT, COMPLICATED_PROMPT, COMPREHENSIVE_PROMPT};
use crate::Result;
use crate::types::AnalysisTier;

/// Everything the dispatcher needs to run one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptSpec {
    pub tier: AnalysisTier,
    #[serde(skip)]
    template: &'static str,
    /// Keys the structured result must contain, in prompt order.
    pub response_shape: &'static [&'static str],
    pub token_budget: u32,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

impl PromptSpec {
    /// Template plus an output contract naming exactly `response_shape`.
    pub fn system_prompt(&self) -> String {
        let keys = self
            .response_shape
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}\n\nOUTPUT: respond with a single JSON object whose top-level keys are exactly: {}. \
             Use null for any section the document does not support.",
            self.template, keys
        )
    }
}

const BASIC: PromptSpec = PromptSpec {
    tier: AnalysisTier::Basic,
    template: BASIC_PROMPT,
    response_shape: &["vital_signs", "medications", "conditions", "assessment"],
    token_budget: 1000,
    description: "Standard medical document analysis",
    features: &[
        "Vital signs extraction",
        "Medication identification",
        "Basic condition recognition",
        "SOAP note parsing",
    ],
};

const COMPREHENSIVE: PromptSpec = PromptSpec {
    tier: AnalysisTier::Comprehensive,
    template: COMPREHENSIVE_PROMPT,
    response_shape: &[
        "vital_signs",
        "medications",
        "conditions",
        "lab_results",
        "clinical_assessment",
        "treatment_plan",
        "risk_factors",
        "recommendations",
        "follow_up",
        "quality_flags",
    ],
    token_budget: 4096,
    description: "Full clinical analysis with insights and recommendations",
    features: &[
        "All basic features",
        "Detailed clinical insights",
        "Risk factor analysis",
        "Treatment recommendations",
        "Follow-up scheduling suggestions",
    ],
};

const BATCH: PromptSpec = PromptSpec {
    tier: AnalysisTier::Batch,
    template: BATCH_PROMPT,
    response_shape: &[
        "vital_signs",
        "medications",
        "conditions",
        "critical_flags",
        "document_summary",
    ],
    token_budget: 1000,
    description: "Bulk processing per document, optimized for multiple files",
    features: &[
        "Bulk document processing",
        "Volume discounts",
        "Critical finding flags",
        "Batch reporting",
    ],
};

const COMPLICATED: PromptSpec = PromptSpec {
    tier: AnalysisTier::Complicated,
    template: COMPLICATED_PROMPT,
    response_shape: &[
        "document_assessment",
        "clinical_data",
        "reasoning_analysis",
        "quality_assurance",
        "recommendations",
        "metadata",
    ],
    token_budget: 8192,
    description: "Multi-step clinical reasoning with quality assurance and specialist-level analysis",
    features: &[
        "Multi-step clinical reasoning",
        "Specialist-level analysis",
        "Quality assurance validation",
        "Evidence-based recommendations",
        "Risk stratification",
        "Medication interaction analysis",
        "Guideline adherence assessment",
    ],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptCatalog;

impl PromptCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn get_prompt(&self, tier: AnalysisTier) -> &'static PromptSpec {
        match tier {
            AnalysisTier::Basic => &BASIC,
            AnalysisTier::Comprehensive => &COMPREHENSIVE,
            AnalysisTier::Batch => &BATCH,
            AnalysisTier::Complicated => &COMPLICATED,
        }
    }

    /// Resolve a caller-supplied tier name. Fails with `UnknownTier`.
    pub fn resolve(&self, tier: &str) -> Result<&'static PromptSpec> {
        Ok(self.get_prompt(tier.parse()?))
    }

    pub fn all(&self) -> impl Iterator<Item = &'static PromptSpec> + '_ {
        AnalysisTier::ALL.into_iter().map(|t| self.get_prompt(t))
    }
}
