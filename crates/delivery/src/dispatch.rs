use async_trait::async_trait;

use adpanel_core::{
    ArtifactRef, Customer, DeliveryError, DeliveryOutcome, DeliveryRequest, DeliveryService,
    DocType, SendChannel,
};
use tracing::info;

/// What a channel adapter needs to compose one outbound message.
#[derive(Clone, Copy, Debug)]
pub struct ChannelMessage<'a> {
    pub customer: &'a Customer,
    pub doc_types: &'a [DocType],
    /// Absolute download links for the generated artifacts, in order.
    pub links: &'a [String],
}

/// One delivery channel. Adapters report their result as an outcome rather
/// than an error, so one channel failing never blocks the others.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(&self, message: ChannelMessage<'_>) -> DeliveryOutcome;
}

/// Fans a delivery request out to the requested channels. Channels that were
/// not requested, or whose contact field is empty, are skipped entirely and
/// produce no outcome.
pub struct ChannelDispatcher<E, M> {
    email: E,
    messaging: M,
    public_base_url: String,
}

impl<E, M> ChannelDispatcher<E, M> {
    pub fn new(email: E, messaging: M, public_base_url: impl Into<String>) -> Self {
        Self { email, messaging, public_base_url: public_base_url.into() }
    }
}

#[async_trait]
impl<E, M> DeliveryService for ChannelDispatcher<E, M>
where
    E: ChannelSender,
    M: ChannelSender,
{
    async fn deliver(
        &self,
        request: &DeliveryRequest,
    ) -> Result<Vec<DeliveryOutcome>, DeliveryError> {
        let links: Vec<String> = request
            .artifact_refs
            .iter()
            .map(|artifact| absolute_link(&self.public_base_url, artifact))
            .collect();
        let message = ChannelMessage {
            customer: &request.customer,
            doc_types: &request.doc_types,
            links: &links,
        };

        let mut outcomes = Vec::new();

        if request.send_channels.contains(&SendChannel::Email)
            && !request.customer.email.trim().is_empty()
        {
            outcomes.push(self.email.send(message).await);
        }

        if request.send_channels.contains(&SendChannel::Messaging)
            && !request.customer.phone.trim().is_empty()
        {
            outcomes.push(self.messaging.send(message).await);
        }

        info!(
            requested = request.send_channels.len(),
            attempted = outcomes.len(),
            "delivery dispatch finished"
        );
        Ok(outcomes)
    }
}

fn absolute_link(public_base_url: &str, artifact: &ArtifactRef) -> String {
    format!("{}{}", public_base_url.trim_end_matches('/'), artifact.download_href())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use adpanel_core::{
        ArtifactRef, Customer, DeliveryOutcome, DeliveryRequest, DeliveryService, DocType,
        SendChannel,
    };

    use super::{ChannelDispatcher, ChannelMessage, ChannelSender};

    struct RecordingSender {
        channel: SendChannel,
        seen_links: std::sync::Mutex<Vec<String>>,
    }

    impl RecordingSender {
        fn new(channel: SendChannel) -> Self {
            Self { channel, seen_links: std::sync::Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ChannelSender for &RecordingSender {
        async fn send(&self, message: ChannelMessage<'_>) -> DeliveryOutcome {
            self.seen_links.lock().expect("links mutex").extend(message.links.iter().cloned());
            DeliveryOutcome::delivered(self.channel)
        }
    }

    fn request(channels: Vec<SendChannel>, email: &str, phone: &str) -> DeliveryRequest {
        DeliveryRequest {
            artifact_refs: vec![ArtifactRef("artifacts/proposal_1.pdf".to_string())],
            customer: Customer {
                company: "Hanbit Mart".to_string(),
                name: "Jo Yun".to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
            },
            send_channels: channels,
            doc_types: vec![DocType::Proposal],
        }
    }

    #[tokio::test]
    async fn only_requested_channels_are_attempted() {
        let email = RecordingSender::new(SendChannel::Email);
        let messaging = RecordingSender::new(SendChannel::Messaging);
        let dispatcher = ChannelDispatcher::new(&email, &messaging, "https://quotes.example.com/");

        let outcomes = dispatcher
            .deliver(&request(vec![SendChannel::Email], "buyer@example.com", "010-1234-5678"))
            .await
            .expect("dispatch succeeds");

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].channel, SendChannel::Email);
        assert!(messaging.seen_links.lock().expect("links mutex").is_empty());
    }

    #[tokio::test]
    async fn channels_without_contact_details_are_skipped() {
        let email = RecordingSender::new(SendChannel::Email);
        let messaging = RecordingSender::new(SendChannel::Messaging);
        let dispatcher = ChannelDispatcher::new(&email, &messaging, "https://quotes.example.com");

        let outcomes = dispatcher
            .deliver(&request(
                vec![SendChannel::Email, SendChannel::Messaging],
                "",
                "010-1234-5678",
            ))
            .await
            .expect("dispatch succeeds");

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].channel, SendChannel::Messaging);
    }

    #[tokio::test]
    async fn links_are_absolute_and_ordered() {
        let email = RecordingSender::new(SendChannel::Email);
        let messaging = RecordingSender::new(SendChannel::Messaging);
        let dispatcher = ChannelDispatcher::new(&email, &messaging, "https://quotes.example.com/");

        dispatcher
            .deliver(&request(vec![SendChannel::Email], "buyer@example.com", ""))
            .await
            .expect("dispatch succeeds");

        let links = email.seen_links.lock().expect("links mutex").clone();
        assert_eq!(links, vec!["https://quotes.example.com/download/proposal_1.pdf".to_string()]);
    }

    #[tokio::test]
    async fn empty_channel_selection_yields_no_outcomes() {
        let email = RecordingSender::new(SendChannel::Email);
        let messaging = RecordingSender::new(SendChannel::Messaging);
        let dispatcher = ChannelDispatcher::new(&email, &messaging, "https://quotes.example.com");

        let outcomes = dispatcher
            .deliver(&request(Vec::new(), "buyer@example.com", "010-1234-5678"))
            .await
            .expect("dispatch succeeds");

        assert!(outcomes.is_empty());
    }
}
