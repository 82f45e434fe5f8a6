use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Discount rules applied by [`BillingCalculator`](super::BillingCalculator).
///
/// Volume and enterprise rates are additive; the sum is clamped to
/// `[0, max_rate]` so a quote can never reach zero or go negative.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscountPolicy {
    pub volume_threshold: i64,
    pub volume_rate: Decimal,
    pub enterprise_rate: Decimal,
    pub max_rate: Decimal,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self {
            volume_threshold: 10,
            volume_rate: dec!(0.10),
            enterprise_rate: dec!(0.15),
            max_rate: dec!(0.99),
        }
    }
}

impl DiscountPolicy {
    pub fn volume_rate_for(&self, document_count: i64) -> Decimal {
        if document_count >= self.volume_threshold {
            self.volume_rate
        } else {
            Decimal::ZERO
        }
    }

    pub fn enterprise_rate_for(&self, is_enterprise: bool) -> Decimal {
        if is_enterprise {
            self.enterprise_rate
        } else {
            Decimal::ZERO
        }
    }

    pub fn combined(&self, document_count: i64, is_enterprise: bool) -> Decimal {
        (self.volume_rate_for(document_count) + self.enterprise_rate_for(is_enterprise))
            .clamp(Decimal::ZERO, self.max_rate)
    }
}
