use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::contact::Customer;
use crate::domain::quote::{DocType, Quote, SendChannel};
use crate::pricing::QuoteTotals;

/// Opaque reference to a generated document, resolvable to a download.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef(pub String);

impl ArtifactRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Stable download location derived from the ref.
    pub fn download_href(&self) -> String {
        format!("/download/{}", self.file_name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub artifact_refs: Vec<ArtifactRef>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation service unreachable: {0}")]
    Unreachable(String),
    #[error("document rendering failed: {0}")]
    Render(String),
    #[error("artifact could not be stored: {0}")]
    Store(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub artifact_refs: Vec<ArtifactRef>,
    pub customer: Customer,
    pub send_channels: Vec<SendChannel>,
    pub doc_types: Vec<DocType>,
}

/// Result of one channel attempt. Channels that were not requested produce
/// no outcome at all rather than a failure entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub channel: SendChannel,
    pub success: bool,
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(channel: SendChannel) -> Self {
        Self { channel, success: true, error: None }
    }

    pub fn failed(channel: SendChannel, error: impl Into<String>) -> Self {
        Self { channel, success: false, error: Some(error.into()) }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("delivery service unreachable: {0}")]
    Unreachable(String),
}

/// Document generation boundary. A response with `success == false` means
/// the service declined; transport problems surface as errors. Either way
/// the Generate stage fails and control returns to editing.
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    async fn generate(
        &self,
        quote: &Quote,
        totals: &QuoteTotals,
    ) -> Result<GenerationResponse, GenerationError>;
}

/// Multi-channel dispatch boundary. Returns one outcome per attempted
/// channel; a transport-level error means nothing was attempted at all.
#[async_trait]
pub trait DeliveryService: Send + Sync {
    async fn deliver(
        &self,
        request: &DeliveryRequest,
    ) -> Result<Vec<DeliveryOutcome>, DeliveryError>;
}
