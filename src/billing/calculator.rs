use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{DiscountPolicy, MINOR_UNITS, unit_price};
use crate::payment::DEFAULT_CURRENCY;
use crate::types::AnalysisTier;
use crate::{Error, Result};

const MONEY_SCALE: u32 = 2;

/// A deterministic price for `document_count` documents at one tier.
///
/// Carries no timestamp: identical inputs serialise identically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingQuote {
    pub tier: AnalysisTier,
    pub document_count: i64,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub volume_discount_rate: Decimal,
    pub enterprise_discount_rate: Decimal,
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    /// `total_amount` in the currency's minor unit (cents).
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Clone, Debug)]
pub struct BillingCalculator {
    policy: DiscountPolicy,
    currency: String,
}

impl Default for BillingCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

impl BillingCalculator {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            policy: DiscountPolicy::default(),
            currency: currency.into(),
        }
    }

    pub fn with_policy(mut self, policy: DiscountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn policy(&self) -> &DiscountPolicy {
        &self.policy
    }

    pub fn quote(
        &self,
        tier: AnalysisTier,
        document_count: i64,
        is_enterprise: bool,
    ) -> Result<BillingQuote> {
        if document_count < 1 {
            return Err(Error::InvalidQuantity {
                count: document_count,
            });
        }

        let unit = unit_price(tier);
        let overflow = || Error::InvalidQuantity {
            count: document_count,
        };

        let subtotal = unit
            .checked_mul(Decimal::from(document_count))
            .ok_or_else(overflow)?;
        let volume = self.policy.volume_rate_for(document_count);
        let enterprise = self.policy.enterprise_rate_for(is_enterprise);
        let rate = self.policy.combined(document_count, is_enterprise);

        let total = round_money(
            subtotal
                .checked_mul(Decimal::ONE - rate)
                .ok_or_else(overflow)?,
        );
        let subtotal = round_money(subtotal);
        let amount_minor = (total * MINOR_UNITS).to_i64().ok_or_else(overflow)?;

        Ok(BillingQuote {
            tier,
            document_count,
            unit_price: unit,
            subtotal,
            volume_discount_rate: volume,
            enterprise_discount_rate: enterprise,
            discount_rate: rate,
            discount_amount: subtotal - total,
            total_amount: total,
            amount_minor,
            currency: self.currency.clone(),
        })
    }
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
