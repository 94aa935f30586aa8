use serde::{Deserialize, Serialize};

use crate::domain::quote::{Quote, SendChannel};
use crate::workflow::states::Stage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    MissingDocType,
    MissingLineItems,
    MissingSendChannel,
    MissingEmail,
    MissingPhone,
}

impl ValidationFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingDocType => "select at least one document type",
            Self::MissingLineItems => "enter at least one apartment",
            Self::MissingSendChannel => "select at least one send channel",
            Self::MissingEmail => "an email address is required for email delivery",
            Self::MissingPhone => "a phone number is required for messaging delivery",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: String,
    pub failure: Option<ValidationFailure>,
}

impl ValidationResult {
    fn pass() -> Self {
        Self { valid: true, reason: "quote is ready".to_string(), failure: None }
    }

    fn fail(failure: ValidationFailure) -> Self {
        Self { valid: false, reason: failure.reason().to_string(), failure: Some(failure) }
    }
}

/// Minimum-input rules gating each stage transition. Rules are checked in a
/// fixed order and short-circuit on the first failure; validation never has
/// side effects and is simply re-run after the operator edits the form.
#[derive(Clone, Debug, Default)]
pub struct QuoteValidator;

impl QuoteValidator {
    pub fn validate(&self, quote: &Quote, stage: Stage) -> ValidationResult {
        if quote.doc_types.is_empty() {
            return ValidationResult::fail(ValidationFailure::MissingDocType);
        }

        if !quote.line_items.iter().any(|item| item.contributes()) {
            return ValidationResult::fail(ValidationFailure::MissingLineItems);
        }

        if stage == Stage::Send {
            if quote.send_channels.is_empty() {
                return ValidationResult::fail(ValidationFailure::MissingSendChannel);
            }

            if quote.send_channels.contains(&SendChannel::Email)
                && quote.customer.email.trim().is_empty()
            {
                return ValidationResult::fail(ValidationFailure::MissingEmail);
            }

            if quote.send_channels.contains(&SendChannel::Messaging)
                && quote.customer.phone.trim().is_empty()
            {
                return ValidationResult::fail(ValidationFailure::MissingPhone);
            }
        }

        ValidationResult::pass()
    }
}

#[cfg(test)]
mod tests {
    use super::{QuoteValidator, ValidationFailure};
    use crate::domain::contact::Customer;
    use crate::domain::line_item::LineItem;
    use crate::domain::quote::{ContractDuration, DiscountTier, DocType, Quote, SendChannel};
    use crate::workflow::states::Stage;

    fn quote() -> Quote {
        Quote {
            doc_types: vec![DocType::Proposal],
            customer: Customer::default(),
            line_items: vec![LineItem {
                name: "Dawn Hills".to_string(),
                monitor_count: 3,
                unit_price: 100,
            }],
            discount_tier: DiscountTier::None,
            duration: ContractDuration::Three,
            manager: None,
            send_channels: Vec::new(),
        }
    }

    #[test]
    fn first_failing_rule_wins() {
        let mut incomplete = quote();
        incomplete.doc_types.clear();
        incomplete.line_items.clear();

        let result = QuoteValidator.validate(&incomplete, Stage::Preview);
        assert_eq!(result.failure, Some(ValidationFailure::MissingDocType));
    }

    #[test]
    fn preview_requires_a_contributing_line_item() {
        let mut blank_rows = quote();
        blank_rows.line_items =
            vec![LineItem { name: String::new(), monitor_count: 0, unit_price: 500 }];

        let result = QuoteValidator.validate(&blank_rows, Stage::Preview);
        assert_eq!(result.failure, Some(ValidationFailure::MissingLineItems));
    }

    #[test]
    fn channel_rules_only_apply_to_the_send_stage() {
        let no_channels = quote();

        assert!(QuoteValidator.validate(&no_channels, Stage::Preview).valid);
        assert!(QuoteValidator.validate(&no_channels, Stage::Generate).valid);

        let result = QuoteValidator.validate(&no_channels, Stage::Send);
        assert_eq!(result.failure, Some(ValidationFailure::MissingSendChannel));
    }

    #[test]
    fn email_channel_requires_an_address() {
        let mut email_only = quote();
        email_only.send_channels = vec![SendChannel::Email];

        let result = QuoteValidator.validate(&email_only, Stage::Send);
        assert_eq!(result.failure, Some(ValidationFailure::MissingEmail));

        email_only.customer.email = "buyer@example.com".to_string();
        assert!(QuoteValidator.validate(&email_only, Stage::Send).valid);
    }

    #[test]
    fn messaging_channel_requires_a_phone_number() {
        let mut messaging_only = quote();
        messaging_only.send_channels = vec![SendChannel::Messaging];

        let result = QuoteValidator.validate(&messaging_only, Stage::Send);
        assert_eq!(result.failure, Some(ValidationFailure::MissingPhone));
        assert_eq!(result.reason, "a phone number is required for messaging delivery");

        messaging_only.customer.phone = "010-1234-5678".to_string();
        assert!(QuoteValidator.validate(&messaging_only, Stage::Send).valid);
    }
}
