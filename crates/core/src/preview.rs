use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::quote::{doc_type_title, DocType, Quote};
use crate::pricing::QuoteTotals;

/// Comma-grouped amount in the smallest currency unit, e.g. `1,234,500`.
pub fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemCard {
    pub position: usize,
    pub name: String,
    pub monitor_count: u32,
    pub unit_price: String,
    pub monthly_total: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountLine {
    pub label: String,
    pub amount: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub total_monthly: String,
    /// Present only when a positive discount rate applies.
    pub discount: Option<DiscountLine>,
    pub monthly_final: String,
    pub duration_months: u64,
    pub final_total: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerBlock {
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: String,
}

/// Read-only payload for the preview step. Rendering it to a surface is the
/// caller's concern; this is the complete typed content of the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPreview {
    pub title: String,
    pub issued_on: String,
    pub recipient_company: String,
    pub recipient_name: String,
    pub cards: Vec<LineItemCard>,
    pub summary: PreviewSummary,
    pub includes_proposal_attachment: bool,
    pub manager: Option<ManagerBlock>,
}

pub fn render_preview(quote: &Quote, totals: &QuoteTotals) -> DocumentPreview {
    let cards = quote
        .line_items
        .iter()
        .enumerate()
        .map(|(index, item)| LineItemCard {
            position: index + 1,
            name: item.name.clone(),
            monitor_count: item.monitor_count,
            unit_price: format_currency(item.unit_price),
            monthly_total: format_currency(item.monthly_total()),
        })
        .collect();

    let discount = totals.has_discount().then(|| DiscountLine {
        label: quote.discount_tier.label().to_string(),
        amount: format!("-{}", format_currency(totals.discount_amount)),
    });

    let manager = quote.manager.as_ref().map(|manager| ManagerBlock {
        name: manager.name.clone(),
        position: manager.position.clone(),
        phone: manager.phone.clone(),
        email: manager.email.clone(),
    });

    DocumentPreview {
        title: doc_type_title(&quote.doc_types),
        issued_on: Utc::now().format("%Y-%m-%d").to_string(),
        recipient_company: placeholder_if_empty(&quote.customer.company),
        recipient_name: placeholder_if_empty(&quote.customer.name),
        cards,
        summary: PreviewSummary {
            total_monthly: format_currency(totals.total_monthly),
            discount,
            monthly_final: format_currency(totals.monthly_final),
            duration_months: quote.duration.months(),
            final_total: format_currency(totals.final_total),
        },
        includes_proposal_attachment: quote.doc_types.contains(&DocType::Proposal),
        manager,
    }
}

fn placeholder_if_empty(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "-".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{format_currency, render_preview};
    use crate::domain::contact::{Customer, Manager};
    use crate::domain::line_item::LineItem;
    use crate::domain::quote::{ContractDuration, DiscountTier, DocType, Quote};
    use crate::pricing::compute_totals;

    fn quote(tier: DiscountTier) -> Quote {
        Quote {
            doc_types: vec![DocType::Proposal, DocType::Estimate],
            customer: Customer {
                company: "Hanbit Mart".to_string(),
                name: "Jo Yun".to_string(),
                email: String::new(),
                phone: String::new(),
            },
            line_items: vec![
                LineItem { name: "A".to_string(), monitor_count: 3, unit_price: 100 },
                LineItem { name: "B".to_string(), monitor_count: 2, unit_price: 150 },
            ],
            discount_tier: tier,
            duration: ContractDuration::Six,
            manager: None,
            send_channels: Vec::new(),
        }
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0), "0");
        assert_eq!(format_currency(999), "999");
        assert_eq!(format_currency(3240), "3,240");
        assert_eq!(format_currency(1_234_500), "1,234,500");
    }

    #[test]
    fn discount_line_appears_only_with_a_positive_rate() {
        let discounted = quote(DiscountTier::TierB);
        let totals = compute_totals(&discounted.line_items, DiscountTier::TierB, discounted.duration);
        let preview = render_preview(&discounted, &totals);
        let line = preview.summary.discount.expect("10% tier renders a discount line");
        assert_eq!(line.amount, "-60");
        assert_eq!(preview.summary.final_total, "3,240");

        let plain = quote(DiscountTier::None);
        let totals = compute_totals(&plain.line_items, DiscountTier::None, plain.duration);
        let preview = render_preview(&plain, &totals);
        assert!(preview.summary.discount.is_none());
    }

    #[test]
    fn cards_keep_line_item_order() {
        let quote = quote(DiscountTier::None);
        let totals = compute_totals(&quote.line_items, quote.discount_tier, quote.duration);
        let preview = render_preview(&quote, &totals);

        assert_eq!(preview.title, "Proposal + Estimate");
        assert!(preview.includes_proposal_attachment);
        assert_eq!(preview.cards.len(), 2);
        assert_eq!(preview.cards[0].position, 1);
        assert_eq!(preview.cards[0].monthly_total, "300");
        assert_eq!(preview.cards[1].name, "B");
    }

    #[test]
    fn manager_block_follows_the_snapshot() {
        let mut with_manager = quote(DiscountTier::None);
        with_manager.manager = Some(Manager {
            name: "Kim".to_string(),
            position: "Account Lead".to_string(),
            phone: "010-0000-0000".to_string(),
            email: "kim@example.com".to_string(),
        });
        let totals =
            compute_totals(&with_manager.line_items, with_manager.discount_tier, with_manager.duration);

        let preview = render_preview(&with_manager, &totals);
        assert_eq!(preview.manager.map(|block| block.name), Some("Kim".to_string()));

        let without = quote(DiscountTier::None);
        let preview = render_preview(&without, &totals);
        assert!(preview.manager.is_none());
    }
}
