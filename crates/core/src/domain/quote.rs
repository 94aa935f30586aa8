use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::contact::{Customer, Manager};
use crate::domain::line_item::{LineItem, LineItems};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Proposal,
    Estimate,
}

impl DocType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Proposal => "Proposal",
            Self::Estimate => "Estimate",
        }
    }
}

/// Joined document labels for titles, e.g. `Proposal + Estimate`.
pub fn doc_type_title(doc_types: &[DocType]) -> String {
    let labels: Vec<&str> = doc_types.iter().map(DocType::label).collect();
    if labels.is_empty() {
        "Document".to_string()
    } else {
        labels.join(" + ")
    }
}

/// Joined document labels for sentences, e.g. `proposal and estimate`.
pub fn doc_type_phrase(doc_types: &[DocType]) -> String {
    let labels: Vec<String> =
        doc_types.iter().map(|doc| doc.label().to_ascii_lowercase()).collect();
    match labels.len() {
        0 => "document".to_string(),
        1 => labels[0].clone(),
        _ => labels.join(" and "),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendChannel {
    Email,
    Messaging,
}

impl SendChannel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Messaging => "messaging",
        }
    }
}

/// Fixed discount brackets. Keys are opaque form values; anything
/// unrecognized maps to `None` so totals stay computable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTier {
    #[default]
    None,
    TierA,
    TierB,
    TierC,
}

impl DiscountTier {
    pub fn from_key(key: &str) -> Self {
        match key.trim() {
            "5" => Self::TierA,
            "10" => Self::TierB,
            "15" => Self::TierC,
            _ => Self::None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TierA => "5",
            Self::TierB => "10",
            Self::TierC => "15",
        }
    }

    pub fn rate(&self) -> Decimal {
        match self {
            Self::None => Decimal::ZERO,
            Self::TierA => Decimal::new(5, 2),
            Self::TierB => Decimal::new(10, 2),
            Self::TierC => Decimal::new(15, 2),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "No discount",
            Self::TierA => "5% discount",
            Self::TierB => "10% discount",
            Self::TierC => "15% discount",
        }
    }
}

/// Contract length in months, restricted to the offered terms. Absent or
/// unparseable input falls back to the canonical three-month term, so a
/// duration can never be zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractDuration {
    One,
    #[default]
    Three,
    Six,
    Twelve,
}

impl ContractDuration {
    pub fn months(&self) -> u64 {
        match self {
            Self::One => 1,
            Self::Three => 3,
            Self::Six => 6,
            Self::Twelve => 12,
        }
    }

    pub fn from_months(months: u32) -> Option<Self> {
        match months {
            1 => Some(Self::One),
            3 => Some(Self::Three),
            6 => Some(Self::Six),
            12 => Some(Self::Twelve),
            _ => None,
        }
    }

    pub fn parse_or_default(raw: &str) -> Self {
        raw.trim().parse::<u32>().ok().and_then(Self::from_months).unwrap_or_default()
    }
}

/// Immutable quote snapshot captured from the form at a stage transition.
/// Each workflow stage rebuilds it from current form state; it is never
/// edited in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub doc_types: Vec<DocType>,
    pub customer: Customer,
    pub line_items: Vec<LineItem>,
    pub discount_tier: DiscountTier,
    pub duration: ContractDuration,
    pub manager: Option<Manager>,
    pub send_channels: Vec<SendChannel>,
}

/// Editable form state. Discount and duration arrive as raw form values and
/// are only resolved when a snapshot is taken.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteForm {
    pub doc_types: Vec<DocType>,
    pub customer: Customer,
    pub line_items: LineItems,
    pub discount_key: String,
    pub duration_months: String,
    pub manager: Manager,
    pub send_channels: Vec<SendChannel>,
}

impl QuoteForm {
    pub fn snapshot(&self) -> Quote {
        Quote {
            doc_types: dedup_preserving_order(&self.doc_types),
            customer: self.customer.clone(),
            line_items: self.line_items.contributing(),
            discount_tier: DiscountTier::from_key(&self.discount_key),
            duration: ContractDuration::parse_or_default(&self.duration_months),
            manager: self.manager.is_present().then(|| self.manager.clone()),
            send_channels: dedup_preserving_order(&self.send_channels),
        }
    }
}

fn dedup_preserving_order<T: Copy + PartialEq>(values: &[T]) -> Vec<T> {
    let mut seen = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(value) {
            seen.push(*value);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::{
        doc_type_phrase, doc_type_title, ContractDuration, DiscountTier, DocType, QuoteForm,
        SendChannel,
    };
    use crate::domain::line_item::LineItem;

    #[test]
    fn unknown_discount_keys_map_to_no_discount() {
        assert_eq!(DiscountTier::from_key("5"), DiscountTier::TierA);
        assert_eq!(DiscountTier::from_key("10"), DiscountTier::TierB);
        assert_eq!(DiscountTier::from_key("15"), DiscountTier::TierC);
        assert_eq!(DiscountTier::from_key("none"), DiscountTier::None);
        assert_eq!(DiscountTier::from_key("20"), DiscountTier::None);
        assert_eq!(DiscountTier::from_key(""), DiscountTier::None);
    }

    #[test]
    fn duration_defaults_to_three_months() {
        assert_eq!(ContractDuration::parse_or_default("6").months(), 6);
        assert_eq!(ContractDuration::parse_or_default("").months(), 3);
        assert_eq!(ContractDuration::parse_or_default("abc").months(), 3);
        assert_eq!(ContractDuration::parse_or_default("7").months(), 3);
    }

    #[test]
    fn doc_type_labels_join_for_titles_and_sentences() {
        let both = vec![DocType::Proposal, DocType::Estimate];
        assert_eq!(doc_type_title(&both), "Proposal + Estimate");
        assert_eq!(doc_type_phrase(&both), "proposal and estimate");
        assert_eq!(doc_type_phrase(&[]), "document");
        assert_eq!(doc_type_phrase(&[DocType::Estimate]), "estimate");
    }

    #[test]
    fn snapshot_resolves_raw_form_values() {
        let mut form = QuoteForm {
            doc_types: vec![DocType::Proposal, DocType::Proposal, DocType::Estimate],
            discount_key: "10".to_string(),
            duration_months: "12".to_string(),
            send_channels: vec![SendChannel::Email, SendChannel::Email],
            ..QuoteForm::default()
        };
        form.line_items.add(LineItem { name: "A".to_string(), monitor_count: 2, unit_price: 100 });
        form.line_items.add(LineItem::default());
        form.manager.name = "Kim".to_string();

        let quote = form.snapshot();
        assert_eq!(quote.doc_types, vec![DocType::Proposal, DocType::Estimate]);
        assert_eq!(quote.discount_tier, DiscountTier::TierB);
        assert_eq!(quote.duration, ContractDuration::Twelve);
        assert_eq!(quote.line_items.len(), 1);
        assert_eq!(quote.send_channels, vec![SendChannel::Email]);
        assert!(quote.manager.is_some());
    }

    #[test]
    fn snapshot_omits_absent_manager() {
        let form = QuoteForm { doc_types: vec![DocType::Proposal], ..QuoteForm::default() };
        assert!(form.snapshot().manager.is_none());
    }
}
