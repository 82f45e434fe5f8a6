//! Core types shared by the analysis and payment engines.

mod analysis;
mod tier;
mod tool;
mod usage;

pub use analysis::{
    AnalysisRequest, AnalysisResult, Extraction, PaymentReceipt, ProviderRole,
};
pub use tier::AnalysisTier;
pub use tool::{ToolDefinition, ToolOutput};
pub use usage::TokenUsage;
