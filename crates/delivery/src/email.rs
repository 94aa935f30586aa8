use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{info, warn};

use adpanel_core::config::EmailConfig;
use adpanel_core::{doc_type_phrase, DeliveryOutcome, DocType, SendChannel};

use crate::dispatch::{ChannelMessage, ChannelSender};

const NOT_CONFIGURED: &str =
    "email relay is not configured; set the relay api token and sender address";

/// Sends quote documents through the configured HTTP mail relay.
pub struct EmailSender {
    config: EmailConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct RelayMessage {
    from: String,
    to: String,
    subject: String,
    body: String,
    attachment_urls: Vec<String>,
}

impl EmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config, client: Client::new() }
    }

    fn subject(company: &str, doc_types: &[DocType]) -> String {
        format!("[{}] {} enclosed", company.trim(), doc_type_phrase(doc_types))
    }

    fn body(recipient: &str, doc_types: &[DocType], links: &[String]) -> String {
        let mut body = format!(
            "Hello {recipient},\n\nPlease find the requested {} attached.\n",
            doc_type_phrase(doc_types)
        );
        if !links.is_empty() {
            body.push_str("\nYou can also download the documents here:\n");
            for link in links {
                body.push_str("  ");
                body.push_str(link);
                body.push('\n');
            }
        }
        body.push_str("\nFeel free to reach out with any questions.\n");
        body
    }
}

#[async_trait]
impl ChannelSender for EmailSender {
    async fn send(&self, message: ChannelMessage<'_>) -> DeliveryOutcome {
        if !self.config.is_configured() {
            warn!("email send skipped: relay credentials missing");
            return DeliveryOutcome::failed(SendChannel::Email, NOT_CONFIGURED);
        }
        let Some(token) = self.config.api_token.as_ref() else {
            return DeliveryOutcome::failed(SendChannel::Email, NOT_CONFIGURED);
        };

        let relay_message = RelayMessage {
            from: format!("{} <{}>", self.config.sender_name, self.config.sender_address),
            to: message.customer.email.trim().to_string(),
            subject: Self::subject(&message.customer.company, message.doc_types),
            body: Self::body(message.customer.display_name(), message.doc_types, message.links),
            attachment_urls: message.links.to_vec(),
        };

        let response = self
            .client
            .post(&self.config.relay_url)
            .bearer_auth(token.expose_secret())
            .json(&relay_message)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(to = %relay_message.to, "email relay accepted the message");
                DeliveryOutcome::delivered(SendChannel::Email)
            }
            Ok(response) => {
                let status = response.status();
                warn!(status = %status, "email relay rejected the message");
                DeliveryOutcome::failed(
                    SendChannel::Email,
                    format!("mail relay returned status {status}"),
                )
            }
            Err(error) => {
                warn!(error = %error, "email relay request failed");
                DeliveryOutcome::failed(SendChannel::Email, error.to_string())
            }
        }
    }
}
