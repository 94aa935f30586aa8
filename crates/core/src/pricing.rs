use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::line_item::LineItem;
use crate::domain::quote::{ContractDuration, DiscountTier, Quote};

/// Derived monetary summary of a quote. All amounts are non-negative
/// integers in the smallest currency unit; only the tier-rate multiply uses
/// fractional arithmetic, and its result is floored immediately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub total_monthly: u64,
    pub discount_rate: Decimal,
    pub discount_amount: u64,
    pub monthly_final: u64,
    pub final_total: u64,
}

impl QuoteTotals {
    pub fn has_discount(&self) -> bool {
        self.discount_rate > Decimal::ZERO
    }
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, quote: &Quote) -> QuoteTotals;
}

#[derive(Clone, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, quote: &Quote) -> QuoteTotals {
        compute_totals(&quote.line_items, quote.discount_tier, quote.duration)
    }
}

/// Pure total computation; callable repeatedly on the same inputs, since the
/// form recomputes on every change.
pub fn compute_totals(
    line_items: &[LineItem],
    tier: DiscountTier,
    duration: ContractDuration,
) -> QuoteTotals {
    let total_monthly = line_items
        .iter()
        .map(LineItem::monthly_total)
        .fold(0u64, |acc, monthly| acc.saturating_add(monthly));

    let discount_rate = tier.rate();
    // Floored, not rounded: the customer is never overcharged by rounding.
    let discount_amount =
        (Decimal::from(total_monthly) * discount_rate).floor().to_u64().unwrap_or(0);
    let monthly_final = total_monthly - discount_amount;
    let final_total = monthly_final.saturating_mul(duration.months());

    QuoteTotals { total_monthly, discount_rate, discount_amount, monthly_final, final_total }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{compute_totals, DeterministicPricingEngine, PricingEngine};
    use crate::domain::contact::Customer;
    use crate::domain::line_item::LineItem;
    use crate::domain::quote::{ContractDuration, DiscountTier, DocType, Quote};

    fn item(name: &str, monitor_count: u32, unit_price: u64) -> LineItem {
        LineItem { name: name.to_string(), monitor_count, unit_price }
    }

    #[test]
    fn two_apartment_tier_b_scenario() {
        let items = vec![item("A", 3, 100), item("B", 2, 150)];
        let totals = compute_totals(&items, DiscountTier::TierB, ContractDuration::Six);

        assert_eq!(totals.total_monthly, 600);
        assert_eq!(totals.discount_amount, 60);
        assert_eq!(totals.monthly_final, 540);
        assert_eq!(totals.final_total, 3240);
    }

    #[test]
    fn discount_is_floored_never_rounded_up() {
        // 5% of 1010 is 50.5; the customer is charged as if 50.
        let items = vec![item("A", 1, 1010)];
        let totals = compute_totals(&items, DiscountTier::TierA, ContractDuration::Three);

        assert_eq!(totals.discount_amount, 50);
        assert_eq!(totals.monthly_final, 960);
        assert_eq!(totals.final_total, 2880);
    }

    #[test]
    fn no_discount_tier_keeps_totals_unchanged() {
        let items = vec![item("A", 4, 250)];
        let totals = compute_totals(&items, DiscountTier::None, ContractDuration::Twelve);

        assert_eq!(totals.discount_rate, Decimal::ZERO);
        assert_eq!(totals.discount_amount, 0);
        assert!(!totals.has_discount());
        assert_eq!(totals.monthly_final, 1000);
        assert_eq!(totals.final_total, 12_000);
    }

    #[test]
    fn unknown_tier_key_prices_like_no_discount() {
        let items = vec![item("A", 3, 100)];
        let unknown = compute_totals(
            &items,
            crate::domain::quote::DiscountTier::from_key("30"),
            ContractDuration::Three,
        );
        let none = compute_totals(&items, DiscountTier::None, ContractDuration::Three);

        assert_eq!(unknown, none);
    }

    #[test]
    fn pricing_is_idempotent_for_identical_inputs() {
        let items = vec![item("A", 7, 333), item("B", 5, 910)];
        let first = compute_totals(&items, DiscountTier::TierC, ContractDuration::Six);
        let second = compute_totals(&items, DiscountTier::TierC, ContractDuration::Six);

        assert_eq!(first, second);
    }

    #[test]
    fn empty_quotes_price_to_zero() {
        let totals = compute_totals(&[], DiscountTier::TierB, ContractDuration::Six);
        assert_eq!(totals.total_monthly, 0);
        assert_eq!(totals.final_total, 0);
    }

    #[test]
    fn engine_prices_a_quote_snapshot() {
        let quote = Quote {
            doc_types: vec![DocType::Proposal],
            customer: Customer::default(),
            line_items: vec![item("A", 3, 100), item("B", 2, 150)],
            discount_tier: DiscountTier::TierB,
            duration: ContractDuration::Six,
            manager: None,
            send_channels: Vec::new(),
        };

        let totals = DeterministicPricingEngine.price(&quote);
        assert_eq!(totals.final_total, 3240);
    }
}
