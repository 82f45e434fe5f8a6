//! Test fixtures for the tools module.

use std::sync::Arc;

use crate::analysis::AnalysisDispatcher;
use crate::billing::BillingCalculator;
use crate::patients::SampleDirectory;
use crate::payment::PaymentWorkflow;
use crate::service::MedicalAgent;
use crate::testing::{ScriptedLedger, ScriptedProvider};

pub const BASIC_JSON: &str = r#"```json
{"vital_signs": {"blood_pressure": "150/95"}, "medications": ["Lisinopril 10mg daily"],
 "conditions": ["Hypertension"], "assessment": "Elevated blood pressure"}
```"#;

/// Agent over scripted doubles, with the doubles for inspection.
pub fn agent() -> (Arc<MedicalAgent>, Arc<ScriptedLedger>, Arc<ScriptedProvider>) {
    let ledger = Arc::new(ScriptedLedger::new());
    let primary = Arc::new(ScriptedProvider::succeeding("anthropic", BASIC_JSON));
    let fallback = Arc::new(ScriptedProvider::succeeding("openai", BASIC_JSON));
    let agent = MedicalAgent::new(
        AnalysisDispatcher::new(primary.clone(), fallback),
        PaymentWorkflow::new(ledger.clone(), BillingCalculator::default()),
        Arc::new(SampleDirectory::new()),
    );
    (Arc::new(agent), ledger, primary)
}
