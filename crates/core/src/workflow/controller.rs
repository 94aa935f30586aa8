use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::domain::quote::QuoteForm;
use crate::preview::{render_preview, DocumentPreview};
use crate::pricing::{DeterministicPricingEngine, PricingEngine};
use crate::report::{aggregate, DeliveryReport};
use crate::validate::{QuoteValidator, ValidationFailure};
use crate::workflow::services::{
    ArtifactRef, DeliveryRequest, DeliveryService, DocumentGenerator,
};
use crate::workflow::states::{transition, Stage, WorkflowEvent, WorkflowState};

/// Generation problems are reported with this single generic message; the
/// underlying cause only goes to the log.
pub const GENERATION_FAILED_MESSAGE: &str = "document generation failed";
/// Shown when the delivery service itself could not be reached, as opposed
/// to individual channels failing inside a response.
pub const DELIVERY_FAILED_MESSAGE: &str = "delivery failed";

/// Ticket identifying one stage request. Issuing a new ticket supersedes
/// every earlier one; a stage run holding a stale ticket discards its result
/// instead of applying it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
}

#[derive(Debug, Default)]
struct RequestSequencer {
    last_issued: AtomicU64,
}

impl RequestSequencer {
    fn begin(&self) -> RequestTicket {
        RequestTicket { seq: self.last_issued.fetch_add(1, Ordering::SeqCst) + 1 }
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.seq == self.last_issued.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PreviewOutcome {
    Ready(DocumentPreview),
    Invalid(ValidationFailure),
    Superseded,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GenerateOutcome {
    Generated(Vec<ArtifactRef>),
    Invalid(ValidationFailure),
    Failed,
    Superseded,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome {
    Completed(DeliveryReport),
    Invalid(ValidationFailure),
    /// Send was requested while no generated artifacts were pending.
    NotGenerated,
    Failed,
    Superseded,
}

/// Drives one operator session through Draft → Preview → Generate → Send.
///
/// The controller owns the stage cursor and the most recent preview and
/// delivery report. Every stage run re-snapshots the form (the operator may
/// have edited concurrently), gates on the validator, and checks its request
/// ticket after each external call so a superseded run never applies a stale
/// result. Nothing is retried automatically; failures return control to
/// editing.
pub struct WorkflowController<G, D> {
    generator: G,
    delivery: D,
    pricing: DeterministicPricingEngine,
    validator: QuoteValidator,
    state: Mutex<WorkflowState>,
    sequencer: RequestSequencer,
    latest_preview: Mutex<Option<DocumentPreview>>,
    latest_report: Mutex<Option<DeliveryReport>>,
}

impl<G, D> WorkflowController<G, D>
where
    G: DocumentGenerator,
    D: DeliveryService,
{
    pub fn new(generator: G, delivery: D) -> Self {
        Self {
            generator,
            delivery,
            pricing: DeterministicPricingEngine,
            validator: QuoteValidator,
            state: Mutex::new(WorkflowState::Draft),
            sequencer: RequestSequencer::default(),
            latest_preview: Mutex::new(None),
            latest_report: Mutex::new(None),
        }
    }

    pub fn state(&self) -> WorkflowState {
        *lock(&self.state)
    }

    /// Issue a ticket for an upcoming stage request, superseding all earlier
    /// requests. The convenience stage methods do this themselves.
    pub fn begin_request(&self) -> RequestTicket {
        self.sequencer.begin()
    }

    pub fn current_preview(&self) -> Option<DocumentPreview> {
        lock(&self.latest_preview).clone()
    }

    pub fn latest_report(&self) -> Option<DeliveryReport> {
        lock(&self.latest_report).clone()
    }

    /// Discard the displayed delivery report and return to editing.
    pub fn acknowledge_report(&self) {
        lock(&self.latest_report).take();
        let _ = self.apply(WorkflowEvent::EditResumed);
    }

    pub async fn preview(&self, form: &QuoteForm) -> PreviewOutcome {
        self.preview_as(self.begin_request(), form).await
    }

    pub async fn preview_as(&self, ticket: RequestTicket, form: &QuoteForm) -> PreviewOutcome {
        let quote = form.snapshot();
        let check = self.validator.validate(&quote, Stage::Preview);
        if let Some(failure) = check.failure {
            debug!(reason = %check.reason, "preview blocked by validation");
            return PreviewOutcome::Invalid(failure);
        }

        let _ = self.apply(WorkflowEvent::PreviewRequested);
        let totals = self.pricing.price(&quote);

        if !self.sequencer.is_current(ticket) {
            debug!("discarding superseded preview result");
            return PreviewOutcome::Superseded;
        }

        let preview = render_preview(&quote, &totals);
        *lock(&self.latest_preview) = Some(preview.clone());
        PreviewOutcome::Ready(preview)
    }

    pub async fn generate(&self, form: &QuoteForm) -> GenerateOutcome {
        self.generate_as(self.begin_request(), form).await
    }

    pub async fn generate_as(&self, ticket: RequestTicket, form: &QuoteForm) -> GenerateOutcome {
        let quote = form.snapshot();
        let check = self.validator.validate(&quote, Stage::Generate);
        if let Some(failure) = check.failure {
            debug!(reason = %check.reason, "generate blocked by validation");
            return GenerateOutcome::Invalid(failure);
        }

        let _ = self.apply(WorkflowEvent::GenerateRequested);
        let totals = self.pricing.price(&quote);
        let response = self.generator.generate(&quote, &totals).await;

        if !self.sequencer.is_current(ticket) {
            debug!("discarding superseded generation result");
            return GenerateOutcome::Superseded;
        }

        match response {
            Ok(response) if response.success => {
                info!(artifact_count = response.artifact_refs.len(), "documents generated");
                GenerateOutcome::Generated(response.artifact_refs)
            }
            Ok(_) => {
                warn!("generation service declined the request");
                self.fail_stage(Stage::Generate);
                GenerateOutcome::Failed
            }
            Err(error) => {
                warn!(error = %error, "generation service call failed");
                self.fail_stage(Stage::Generate);
                GenerateOutcome::Failed
            }
        }
    }

    pub async fn send(&self, form: &QuoteForm, artifact_refs: Vec<ArtifactRef>) -> SendOutcome {
        self.send_as(self.begin_request(), form, artifact_refs).await
    }

    pub async fn send_as(
        &self,
        ticket: RequestTicket,
        form: &QuoteForm,
        artifact_refs: Vec<ArtifactRef>,
    ) -> SendOutcome {
        let quote = form.snapshot();
        let check = self.validator.validate(&quote, Stage::Send);
        if let Some(failure) = check.failure {
            debug!(reason = %check.reason, "send blocked by validation");
            return SendOutcome::Invalid(failure);
        }

        if self.apply(WorkflowEvent::SendRequested).is_err() {
            debug!("send requested without pending artifacts");
            return SendOutcome::NotGenerated;
        }

        let request = DeliveryRequest {
            artifact_refs,
            customer: quote.customer,
            send_channels: quote.send_channels,
            doc_types: quote.doc_types,
        };
        let result = self.delivery.deliver(&request).await;

        if !self.sequencer.is_current(ticket) {
            debug!("discarding superseded delivery result");
            return SendOutcome::Superseded;
        }

        match result {
            Ok(outcomes) => {
                // Partial failure is a valid terminal outcome; the run still
                // completes and the report carries the per-channel detail.
                let _ = self.apply(WorkflowEvent::DeliveryResolved);
                let report = aggregate(&outcomes, &request.artifact_refs);
                info!(
                    attempted = report.lines.len(),
                    failed = report
                        .lines
                        .iter()
                        .filter(|line| line.status == crate::report::ReportStatus::Failed)
                        .count(),
                    "delivery resolved"
                );
                *lock(&self.latest_report) = Some(report.clone());
                SendOutcome::Completed(report)
            }
            Err(error) => {
                warn!(error = %error, "delivery service call failed");
                self.fail_stage(Stage::Send);
                SendOutcome::Failed
            }
        }
    }

    fn apply(&self, event: WorkflowEvent) -> Result<(), crate::workflow::states::TransitionError> {
        let mut state = lock(&self.state);
        let outcome = transition(*state, event)?;
        debug!(from = ?outcome.from, to = ?outcome.to, event = ?outcome.event, "workflow transition");
        *state = outcome.to;
        Ok(())
    }

    fn fail_stage(&self, stage: Stage) {
        let _ = self.apply(WorkflowEvent::StageFailed(stage));
        // Every failure returns control to editing; there is no terminal
        // error state.
        let _ = self.apply(WorkflowEvent::EditResumed);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
