//! Stripe-style HTTP ledger.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;

use super::customer::{Customer, NewCustomer, PaymentRecord};
use super::error::{LedgerError, LedgerErrorKind, LedgerOperation, LedgerResult};
use super::intent::{IntentDraft, IntentStatus, PaymentIntent, QuoteMetadata};
use super::ledger::PaymentLedgerAdapter;
use crate::observability::ledger_call_span;

pub const STRIPE_BASE_URL: &str = "https://api.stripe.com";
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(30);
const HISTORY_LIMIT: &str = "10";
const META_ENTERPRISE: &str = "is_enterprise";
const NAME: &str = "stripe";

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Attached as `payment_method` when confirming.
    pub payment_method: Option<String>,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            base_url: STRIPE_BASE_URL.to_string(),
            timeout: DEFAULT_LEDGER_TIMEOUT,
            payment_method: None,
        }
    }
}

impl StripeConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

pub struct StripeLedger {
    config: StripeConfig,
    api_key: SecretString,
    http: reqwest::Client,
}

impl std::fmt::Debug for StripeLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeLedger")
            .field("config", &self.config)
            .finish()
    }
}

impl StripeLedger {
    pub fn new(config: StripeConfig, api_key: SecretString) -> Self {
        Self::with_http(config, api_key, reqwest::Client::new())
    }

    pub fn with_http(config: StripeConfig, api_key: SecretString, http: reqwest::Client) -> Self {
        Self {
            config,
            api_key,
            http,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: LedgerOperation,
        path: &str,
        query: &[(&str, &str)],
    ) -> LedgerResult<T> {
        let request = self.http.get(self.config.endpoint(path)).query(query);
        self.send(operation, request).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        operation: LedgerOperation,
        path: &str,
        form: &[(String, String)],
    ) -> LedgerResult<T> {
        let request = self.http.post(self.config.endpoint(path)).form(form);
        self.send(operation, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: LedgerOperation,
        request: reqwest::RequestBuilder,
    ) -> LedgerResult<T> {
        let span = ledger_call_span(NAME, operation.as_str());
        let record = span.clone();

        async move {
            let response = request
                .bearer_auth(self.api_key.expose_secret())
                .timeout(self.config.timeout)
                .send()
                .await
                .map_err(|e| LedgerError::from_transport(operation, &e))?;

            let status = response.status().as_u16();
            record.record("status", status);
            let body = response
                .text()
                .await
                .map_err(|e| LedgerError::from_transport(operation, &e))?;

            if !(200..300).contains(&status) {
                return Err(LedgerError::from_status(operation, status, &body));
            }
            serde_json::from_str(&body).map_err(|e| {
                LedgerError::malformed(operation, format!("unexpected response: {}", e))
            })
        }
        .instrument(span)
        .await
    }

    /// Confirmation declined by the card network: report the intent as failed.
    async fn declined_intent(
        &self,
        intent_id: &str,
        err: LedgerError,
    ) -> LedgerResult<PaymentIntent> {
        tracing::warn!(
            intent_id,
            code = err.code.as_deref().unwrap_or("unknown"),
            "payment declined"
        );
        let intent = self.get_intent(intent_id).await?;
        Ok(intent.with_status(IntentStatus::Failed))
    }
}

/// Only processor-shaped ids are placed into request paths.
fn checked_id<'a>(operation: LedgerOperation, id: &'a str) -> LedgerResult<&'a str> {
    let valid = !id.is_empty()
        && id.len() <= 255
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(LedgerError::new(
            LedgerErrorKind::NotFound,
            operation,
            "identifier is not a valid processor id",
        )
        .with_resource(id.chars().take(64).collect::<String>()))
    }
}

/// A declined intent returns to `requires_payment_method` with a recorded
/// payment error; that state is terminal here and maps to `Failed`.
fn map_status(
    operation: LedgerOperation,
    status: &str,
    declined: bool,
) -> LedgerResult<IntentStatus> {
    match status {
        "requires_payment_method" if declined => Ok(IntentStatus::Failed),
        "requires_payment_method" | "requires_confirmation" => Ok(IntentStatus::Created),
        "processing" | "requires_action" | "requires_capture" => Ok(IntentStatus::Confirmed),
        "succeeded" => Ok(IntentStatus::Succeeded),
        "canceled" => Ok(IntentStatus::Failed),
        other => Err(LedgerError::malformed(
            operation,
            format!("unknown intent status '{}'", other),
        )),
    }
}

fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    deleted: bool,
}

impl From<StripeCustomer> for Customer {
    fn from(c: StripeCustomer) -> Self {
        Customer {
            is_enterprise: c.metadata.get(META_ENTERPRISE).map(String::as_str) == Some("true"),
            customer_id: c.id,
            email: c.email,
            name: c.name,
            created_at: timestamp(c.created),
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeIntent {
    id: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    customer: Option<String>,
    status: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    created: Option<i64>,
    /// Set by the processor when a confirmation attempt was declined.
    #[serde(default)]
    last_payment_error: Option<serde_json::Value>,
}

impl StripeIntent {
    fn into_intent(self, operation: LedgerOperation) -> LedgerResult<PaymentIntent> {
        let declined = self.last_payment_error.as_ref().is_some_and(|e| !e.is_null());
        Ok(PaymentIntent {
            status: map_status(operation, &self.status, declined)?,
            quote: QuoteMetadata::from_metadata(&self.metadata),
            intent_id: self.id,
            customer_id: self.customer,
            amount_minor: self.amount,
            currency: self.currency,
            created_at: timestamp(self.created),
        })
    }

    fn into_record(self, operation: LedgerOperation) -> LedgerResult<PaymentRecord> {
        let intent = self.into_intent(operation)?;
        Ok(PaymentRecord {
            tier: intent.quote.map(|q| q.tier),
            intent_id: intent.intent_id,
            amount_minor: intent.amount_minor,
            currency: intent.currency,
            status: intent.status,
            created_at: intent.created_at,
        })
    }
}

#[async_trait]
impl PaymentLedgerAdapter for StripeLedger {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn create_customer(&self, customer: &NewCustomer) -> LedgerResult<Customer> {
        let op = LedgerOperation::CreateCustomer;
        let existing: ListResponse<StripeCustomer> = self
            .get(op, "/v1/customers", &[("email", customer.email.as_str()), ("limit", "1")])
            .await?;
        if let Some(found) = existing.data.into_iter().find(|c| !c.deleted) {
            return Err(LedgerError::new(
                LedgerErrorKind::Conflict,
                op,
                "a customer with this email already exists",
            )
            .with_resource(found.id));
        }

        let mut form = vec![
            ("email".to_string(), customer.email.clone()),
            (
                format!("metadata[{}]", META_ENTERPRISE),
                customer.is_enterprise.to_string(),
            ),
            (
                "description".to_string(),
                "Medical analysis customer".to_string(),
            ),
        ];
        if let Some(name) = &customer.name {
            form.push(("name".to_string(), name.clone()));
        }

        let created: StripeCustomer = self.post(op, "/v1/customers", &form).await?;
        Ok(created.into())
    }

    async fn get_customer(&self, customer_id: &str) -> LedgerResult<Customer> {
        let op = LedgerOperation::GetCustomer;
        let id = checked_id(op, customer_id)?;
        let customer: StripeCustomer = self.get(op, &format!("/v1/customers/{}", id), &[]).await?;
        if customer.deleted {
            return Err(
                LedgerError::new(LedgerErrorKind::NotFound, op, "customer was deleted")
                    .with_resource(id),
            );
        }
        Ok(customer.into())
    }

    async fn list_payments(&self, customer_id: &str) -> LedgerResult<Vec<PaymentRecord>> {
        let op = LedgerOperation::ListPayments;
        let id = checked_id(op, customer_id)?;
        let list: ListResponse<StripeIntent> = self
            .get(op, "/v1/payment_intents", &[("customer", id), ("limit", HISTORY_LIMIT)])
            .await?;
        list.data
            .into_iter()
            .map(|intent| intent.into_record(op))
            .collect()
    }

    async fn create_intent(&self, draft: &IntentDraft) -> LedgerResult<PaymentIntent> {
        let op = LedgerOperation::CreateIntent;
        let mut form = vec![
            ("amount".to_string(), draft.amount_minor.to_string()),
            ("currency".to_string(), draft.currency.clone()),
            ("customer".to_string(), draft.customer_id.clone()),
            ("description".to_string(), draft.description.clone()),
        ];
        form.extend(
            draft
                .quote
                .to_pairs()
                .into_iter()
                .map(|(k, v)| (format!("metadata[{}]", k), v)),
        );

        let intent: StripeIntent = self.post(op, "/v1/payment_intents", &form).await?;
        intent.into_intent(op)
    }

    async fn get_intent(&self, intent_id: &str) -> LedgerResult<PaymentIntent> {
        let op = LedgerOperation::GetIntent;
        let id = checked_id(op, intent_id)?;
        let intent: StripeIntent = self
            .get(op, &format!("/v1/payment_intents/{}", id), &[])
            .await?;
        intent.into_intent(op)
    }

    async fn confirm_intent(&self, intent_id: &str) -> LedgerResult<PaymentIntent> {
        let op = LedgerOperation::ConfirmIntent;
        let id = checked_id(op, intent_id)?;
        let mut form = Vec::new();
        if let Some(method) = &self.config.payment_method {
            form.push(("payment_method".to_string(), method.clone()));
        }

        match self
            .post::<StripeIntent>(op, &format!("/v1/payment_intents/{}/confirm", id), &form)
            .await
        {
            Ok(intent) => intent.into_intent(op),
            Err(err) if err.is_card_error() => self.declined_intent(id, err).await,
            Err(err) => Err(err),
        }
    }
}
