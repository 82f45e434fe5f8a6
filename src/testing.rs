//! In-process doubles for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::client::{
    Completion, CompletionRequest, ProviderAdapter, ProviderConfig, ProviderError,
    ProviderErrorKind, ProviderResult,
};
use crate::payment::{
    Customer, IntentDraft, IntentStatus, LedgerError, LedgerErrorKind, LedgerOperation,
    LedgerResult, NewCustomer, PaymentIntent, PaymentLedgerAdapter, PaymentRecord,
};
use crate::types::TokenUsage;

/// Provider that returns a fixed reply or a fixed error kind.
#[derive(Debug)]
pub struct ScriptedProvider {
    name: &'static str,
    config: ProviderConfig,
    outcome: Result<String, ProviderErrorKind>,
    usage: TokenUsage,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedProvider {
    fn with_outcome(name: &'static str, outcome: Result<String, ProviderErrorKind>) -> Self {
        Self {
            name,
            config: ProviderConfig::new(format!("{}-test-model", name), "http://scripted.invalid"),
            outcome,
            usage: TokenUsage::new(10, 5),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn succeeding(name: &'static str, text: impl Into<String>) -> Self {
        Self::with_outcome(name, Ok(text.into()))
    }

    pub fn failing(name: &'static str, kind: ProviderErrorKind) -> Self {
        Self::with_outcome(name, Err(kind))
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.usage = TokenUsage::new(input_tokens, output_tokens);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.outcome {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                usage: self.usage,
                model: self.config.model.clone(),
            }),
            Err(kind) => Err(ProviderError::new(*kind, self.name, "scripted failure")),
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    customers: HashMap<String, Customer>,
    intents: Vec<PaymentIntent>,
    decline_next: bool,
    unavailable: Option<LedgerOperation>,
}

/// In-memory processor that behaves like the HTTP ledger.
#[derive(Debug, Default)]
pub struct ScriptedLedger {
    state: Mutex<LedgerState>,
    calls: AtomicUsize,
    confirms: AtomicUsize,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a customer directly, bypassing call counting.
    pub fn add_customer(&self, email: &str, is_enterprise: bool) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("cus_test_{}", state.customers.len() + 1);
        state.customers.insert(
            id.clone(),
            Customer {
                customer_id: id.clone(),
                email: Some(email.to_string()),
                name: None,
                is_enterprise,
                created_at: Some(Utc::now()),
                history: Vec::new(),
            },
        );
        id
    }

    /// An intent without this service's quote metadata.
    pub fn add_foreign_intent(&self, amount_minor: i64) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("pi_foreign_{}", state.intents.len() + 1);
        state.intents.push(PaymentIntent {
            intent_id: id.clone(),
            customer_id: None,
            amount_minor,
            currency: "usd".to_string(),
            status: IntentStatus::Created,
            quote: None,
            created_at: Some(Utc::now()),
        });
        id
    }

    pub fn set_amount(&self, intent_id: &str, amount_minor: i64) {
        let mut state = self.state.lock().unwrap();
        if let Some(intent) = state.intents.iter_mut().find(|i| i.intent_id == intent_id) {
            intent.amount_minor = amount_minor;
        }
    }

    pub fn decline_next_confirmation(&self) {
        self.state.lock().unwrap().decline_next = true;
    }

    /// Every later call to `operation` fails as unavailable.
    pub fn unavailable_on(&self, operation: LedgerOperation) {
        self.state.lock().unwrap().unavailable = Some(operation);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn confirm_count(&self) -> usize {
        self.confirms.load(Ordering::SeqCst)
    }

    fn enter(
        &self,
        operation: LedgerOperation,
    ) -> LedgerResult<std::sync::MutexGuard<'_, LedgerState>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.unavailable == Some(operation) {
            return Err(LedgerError::unavailable(operation, "scripted outage"));
        }
        Ok(state)
    }
}

fn not_found(operation: LedgerOperation, id: &str) -> LedgerError {
    LedgerError::new(LedgerErrorKind::NotFound, operation, "no such resource").with_resource(id)
}

#[async_trait]
impl PaymentLedgerAdapter for ScriptedLedger {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn create_customer(&self, customer: &NewCustomer) -> LedgerResult<Customer> {
        let mut state = self.enter(LedgerOperation::CreateCustomer)?;
        if let Some(existing) = state
            .customers
            .values()
            .find(|c| c.email.as_deref() == Some(customer.email.as_str()))
        {
            return Err(LedgerError::new(
                LedgerErrorKind::Conflict,
                LedgerOperation::CreateCustomer,
                "email already registered",
            )
            .with_resource(existing.customer_id.clone()));
        }
        let id = format!("cus_test_{}", state.customers.len() + 1);
        let created = Customer {
            customer_id: id.clone(),
            email: Some(customer.email.clone()),
            name: customer.name.clone(),
            is_enterprise: customer.is_enterprise,
            created_at: Some(Utc::now()),
            history: Vec::new(),
        };
        state.customers.insert(id, created.clone());
        Ok(created)
    }

    async fn get_customer(&self, customer_id: &str) -> LedgerResult<Customer> {
        let state = self.enter(LedgerOperation::GetCustomer)?;
        state
            .customers
            .get(customer_id)
            .cloned()
            .ok_or_else(|| not_found(LedgerOperation::GetCustomer, customer_id))
    }

    async fn list_payments(&self, customer_id: &str) -> LedgerResult<Vec<PaymentRecord>> {
        let state = self.enter(LedgerOperation::ListPayments)?;
        Ok(state
            .intents
            .iter()
            .rev()
            .filter(|i| i.customer_id.as_deref() == Some(customer_id))
            .take(10)
            .map(|i| PaymentRecord {
                intent_id: i.intent_id.clone(),
                amount_minor: i.amount_minor,
                currency: i.currency.clone(),
                status: i.status,
                tier: i.quote.map(|q| q.tier),
                created_at: i.created_at,
            })
            .collect())
    }

    async fn create_intent(&self, draft: &IntentDraft) -> LedgerResult<PaymentIntent> {
        let mut state = self.enter(LedgerOperation::CreateIntent)?;
        if !state.customers.contains_key(&draft.customer_id) {
            return Err(not_found(LedgerOperation::CreateIntent, &draft.customer_id));
        }
        let intent = PaymentIntent {
            intent_id: format!("pi_test_{}", state.intents.len() + 1),
            customer_id: Some(draft.customer_id.clone()),
            amount_minor: draft.amount_minor,
            currency: draft.currency.clone(),
            status: IntentStatus::Created,
            quote: Some(draft.quote),
            created_at: Some(Utc::now()),
        };
        state.intents.push(intent.clone());
        Ok(intent)
    }

    async fn get_intent(&self, intent_id: &str) -> LedgerResult<PaymentIntent> {
        let state = self.enter(LedgerOperation::GetIntent)?;
        state
            .intents
            .iter()
            .find(|i| i.intent_id == intent_id)
            .cloned()
            .ok_or_else(|| not_found(LedgerOperation::GetIntent, intent_id))
    }

    async fn confirm_intent(&self, intent_id: &str) -> LedgerResult<PaymentIntent> {
        let mut state = self.enter(LedgerOperation::ConfirmIntent)?;
        self.confirms.fetch_add(1, Ordering::SeqCst);
        let status = if std::mem::take(&mut state.decline_next) {
            IntentStatus::Failed
        } else {
            IntentStatus::Succeeded
        };
        let intent = state
            .intents
            .iter_mut()
            .find(|i| i.intent_id == intent_id)
            .ok_or_else(|| not_found(LedgerOperation::ConfirmIntent, intent_id))?;
        intent.status = status;
        Ok(intent.clone())
    }
}
