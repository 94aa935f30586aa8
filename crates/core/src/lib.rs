pub mod config;
pub mod domain;
pub mod preview;
pub mod pricing;
pub mod report;
pub mod validate;
pub mod workflow;

pub use domain::contact::{Customer, Manager};
pub use domain::line_item::{LineItem, LineItemId, LineItems};
pub use domain::quote::{
    doc_type_phrase, doc_type_title, ContractDuration, DiscountTier, DocType, Quote, QuoteForm,
    SendChannel,
};
pub use preview::{format_currency, render_preview, DocumentPreview};
pub use pricing::{compute_totals, DeterministicPricingEngine, PricingEngine, QuoteTotals};
pub use report::{aggregate, ArtifactLink, DeliveryReport, ReportLine, ReportStatus};
pub use validate::{QuoteValidator, ValidationFailure, ValidationResult};
pub use workflow::{
    ArtifactRef, DeliveryError, DeliveryOutcome, DeliveryRequest, DeliveryService,
    DocumentGenerator, GenerateOutcome, GenerationError, GenerationResponse, PreviewOutcome,
    RequestTicket, SendOutcome, Stage, TransitionError, WorkflowController, WorkflowEvent,
    WorkflowState, DELIVERY_FAILED_MESSAGE, GENERATION_FAILED_MESSAGE,
};
