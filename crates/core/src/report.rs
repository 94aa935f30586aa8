use serde::{Deserialize, Serialize};

use crate::domain::quote::SendChannel;
use crate::workflow::services::{ArtifactRef, DeliveryOutcome};

const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Delivered,
    Failed,
}

impl ReportStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Delivered => "✅",
            Self::Failed => "❌",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub channel: SendChannel,
    pub status: ReportStatus,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLink {
    pub file_name: String,
    pub href: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub lines: Vec<ReportLine>,
    pub artifacts: Vec<ArtifactLink>,
}

/// Merge per-channel outcomes and artifact refs into the operator-facing
/// report. One line per outcome present; channels that were never attempted
/// simply do not appear. Empty input yields an empty report rather than
/// assuming upstream validation ran.
pub fn aggregate(outcomes: &[DeliveryOutcome], artifact_refs: &[ArtifactRef]) -> DeliveryReport {
    let lines = outcomes
        .iter()
        .map(|outcome| {
            if outcome.success {
                ReportLine {
                    channel: outcome.channel,
                    status: ReportStatus::Delivered,
                    message: format!("{} sent", outcome.channel.label()),
                }
            } else {
                let detail = outcome
                    .error
                    .as_deref()
                    .map(str::trim)
                    .filter(|detail| !detail.is_empty())
                    .unwrap_or(UNKNOWN_ERROR);
                ReportLine {
                    channel: outcome.channel,
                    status: ReportStatus::Failed,
                    message: format!("{} failed: {detail}", outcome.channel.label()),
                }
            }
        })
        .collect();

    let artifacts = artifact_refs
        .iter()
        .map(|artifact| ArtifactLink {
            file_name: artifact.file_name().to_string(),
            href: artifact.download_href(),
        })
        .collect();

    DeliveryReport { lines, artifacts }
}
