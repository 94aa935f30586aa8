use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three gated steps of the pipeline; also names the failure origin in
/// `WorkflowState::Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preview,
    Generate,
    Send,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Draft,
    Previewing,
    Generating,
    Sending,
    Completed,
    Failed(Stage),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    PreviewRequested,
    GenerateRequested,
    SendRequested,
    DeliveryResolved,
    StageFailed(Stage),
    EditResumed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: WorkflowState,
    pub to: WorkflowState,
    pub event: WorkflowEvent,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: WorkflowState, event: WorkflowEvent },
}

/// Pure transition table for one operator session.
///
/// A new preview or generate request supersedes whatever was in flight, so
/// both are accepted from any state. Send is only reachable while generated
/// artifacts are pending, which is what sequences Generate before Send.
/// There is no terminal error state: `EditResumed` returns every state to
/// `Draft`.
pub fn transition(
    state: WorkflowState,
    event: WorkflowEvent,
) -> Result<TransitionOutcome, TransitionError> {
    use WorkflowEvent::{
        DeliveryResolved, EditResumed, GenerateRequested, PreviewRequested, SendRequested,
        StageFailed,
    };
    use WorkflowState::{Completed, Draft, Failed, Generating, Previewing, Sending};

    let to = match (state, event) {
        (_, PreviewRequested) => Previewing,
        (_, GenerateRequested) => Generating,
        (Generating | Sending, SendRequested) => Sending,
        (Sending, DeliveryResolved) => Completed,
        (Generating, StageFailed(Stage::Generate)) => Failed(Stage::Generate),
        (Sending, StageFailed(Stage::Send)) => Failed(Stage::Send),
        (_, EditResumed) => Draft,
        _ => return Err(TransitionError::InvalidTransition { state, event }),
    };

    Ok(TransitionOutcome { from: state, to, event })
}
