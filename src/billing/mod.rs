//! Tier pricing and volume/enterprise discounts.
//!
//! Amounts are exact decimals; nothing here touches binary floating point.

mod calculator;
mod discount;

pub use calculator::{BillingCalculator, BillingQuote};
pub use discount::DiscountPolicy;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::AnalysisTier;

/// Minor units per major unit for the supported (two-decimal) currencies.
pub const MINOR_UNITS: Decimal = dec!(100);

/// Per-document list price in major currency units.
pub fn unit_price(tier: AnalysisTier) -> Decimal {
    match tier {
        AnalysisTier::Basic => dec!(0.10),
        AnalysisTier::Comprehensive => dec!(0.50),
        AnalysisTier::Batch => dec!(0.05),
        AnalysisTier::Complicated => dec!(0.75),
    }
}
