pub mod controller;
pub mod services;
pub mod states;

pub use controller::{
    GenerateOutcome, PreviewOutcome, RequestTicket, SendOutcome, WorkflowController,
    DELIVERY_FAILED_MESSAGE, GENERATION_FAILED_MESSAGE,
};
pub use services::{
    ArtifactRef, DeliveryError, DeliveryOutcome, DeliveryRequest, DeliveryService,
    DocumentGenerator, GenerationError, GenerationResponse,
};
pub use states::{transition, Stage, TransitionError, TransitionOutcome, WorkflowEvent, WorkflowState};
