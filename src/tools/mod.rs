//! Remotely callable tools over a shared [`MedicalAgent`](crate::MedicalAgent).

mod analysis;
mod catalog;
mod payment;
mod registry;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{
    AnalyzeDocumentInput, AnalyzeDocumentTool, PaidAnalysisInput, PaidAnalysisTool,
    PatientSummaryInput, PatientSummaryTool,
};
pub use catalog::{
    CalculateBillingInput, CalculateBillingTool, HealthCheckTool, NoInput, ServicesTool,
};
pub use payment::{
    ConfirmPaymentInput, ConfirmPaymentTool, CreateCustomerInput, CreateCustomerTool,
    CreatePaymentIntentInput, CreatePaymentIntentTool, CustomerInfoInput, CustomerInfoTool,
};
pub use registry::ToolRegistry;
pub use traits::{SchemaTool, Tool};

pub const TOOL_NAMES: &[&str] = &[
    "analyze_medical_document",
    "get_patient_summary",
    "get_available_services",
    "calculate_billing",
    "create_customer",
    "create_payment_intent",
    "confirm_payment",
    "process_paid_analysis",
    "get_customer_info",
    "health_check",
];

fn default_analysis_type() -> String {
    "basic".to_string()
}

fn default_document_count() -> i64 {
    1
}
