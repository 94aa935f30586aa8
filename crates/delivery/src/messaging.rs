use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{info, warn};

use adpanel_core::config::MessagingConfig;
use adpanel_core::{doc_type_phrase, DeliveryOutcome, SendChannel};

use crate::dispatch::{ChannelMessage, ChannelSender};

const NOT_CONFIGURED: &str =
    "alimtalk delivery is not configured; set the agency api key and sender profile key";

/// Sends a templated alimtalk notification through the configured agency
/// API. The agency fills the approved template with the variables below.
pub struct AlimtalkSender {
    config: MessagingConfig,
    client: Client,
}

impl AlimtalkSender {
    pub fn new(config: MessagingConfig) -> Self {
        Self { config, client: Client::new() }
    }
}

/// Agency APIs expect international digits-only numbers: hyphens and spaces
/// are stripped, and a domestic `010` prefix becomes `8210`.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|ch| !matches!(ch, '-' | ' ')).collect();
    if let Some(rest) = digits.strip_prefix("010") {
        format!("8210{rest}")
    } else {
        digits
    }
}

#[async_trait]
impl ChannelSender for AlimtalkSender {
    async fn send(&self, message: ChannelMessage<'_>) -> DeliveryOutcome {
        if !self.config.is_configured() {
            warn!("alimtalk send skipped: agency credentials missing");
            return DeliveryOutcome::failed(SendChannel::Messaging, NOT_CONFIGURED);
        }
        let Some(api_key) = self.config.api_key.as_ref() else {
            return DeliveryOutcome::failed(SendChannel::Messaging, NOT_CONFIGURED);
        };

        let to = normalize_phone(&message.customer.phone);
        let payload = json!({
            "message": {
                "to": to.as_str(),
                "from": self.config.sender_key,
                "kakaoOptions": {
                    "pfId": self.config.sender_key,
                    "templateId": self.config.template_code,
                    "variables": {
                        "#{customer_name}": message.customer.display_name(),
                        "#{doc_type}": doc_type_phrase(message.doc_types),
                        "#{url}": message.links.first().map(String::as_str).unwrap_or(""),
                    },
                },
            },
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key.expose_secret())
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(to = %to, "alimtalk agency accepted the message");
                DeliveryOutcome::delivered(SendChannel::Messaging)
            }
            Ok(response) => {
                let status = response.status();
                warn!(status = %status, "alimtalk agency rejected the message");
                DeliveryOutcome::failed(
                    SendChannel::Messaging,
                    format!("alimtalk agency returned status {status}"),
                )
            }
            Err(error) => {
                warn!(error = %error, "alimtalk request failed");
                DeliveryOutcome::failed(SendChannel::Messaging, error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use adpanel_core::config::MessagingConfig;
    use adpanel_core::{Customer, DocType, SendChannel};

    use super::{normalize_phone, AlimtalkSender, NOT_CONFIGURED};
    use crate::dispatch::{ChannelMessage, ChannelSender};

    #[test]
    fn domestic_numbers_become_international() {
        assert_eq!(normalize_phone("010-1234-5678"), "821012345678");
        assert_eq!(normalize_phone("010 1234 5678"), "821012345678");
        assert_eq!(normalize_phone("821012345678"), "821012345678");
        assert_eq!(normalize_phone("02-555-0100"), "025550100");
    }

    #[tokio::test]
    async fn unconfigured_agency_fails_without_a_network_call() {
        let sender = AlimtalkSender::new(MessagingConfig {
            api_url: "https://api.alimtalk-agency.example.com/v4/send".to_string(),
            api_key: None,
            sender_key: String::new(),
            template_code: String::new(),
        });
        let customer = Customer {
            company: "Hanbit Mart".to_string(),
            name: "Jo Yun".to_string(),
            email: String::new(),
            phone: "010-1234-5678".to_string(),
        };

        let outcome = sender
            .send(ChannelMessage {
                customer: &customer,
                doc_types: &[DocType::Proposal],
                links: &[],
            })
            .await;

        assert_eq!(outcome.channel, SendChannel::Messaging);
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(NOT_CONFIGURED));
    }
}
