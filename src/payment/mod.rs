//! Payment processor boundary and the payment workflow.

mod customer;
mod error;
mod intent;
mod ledger;
mod stripe;
mod workflow;

pub use customer::{Customer, NewCustomer, PaymentRecord};
pub use error::{LedgerError, LedgerErrorKind, LedgerOperation, LedgerResult};
pub use intent::{IntentDraft, IntentStatus, PaymentIntent, QuoteMetadata};
pub use ledger::{PaymentLedgerAdapter, UnconfiguredLedger};
pub use stripe::{DEFAULT_LEDGER_TIMEOUT, STRIPE_BASE_URL, StripeConfig, StripeLedger};
pub use workflow::PaymentWorkflow;

pub const DEFAULT_CURRENCY: &str = "usd";
