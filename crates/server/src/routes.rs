//! HTTP surface for the quote workflow.
//!
//! Endpoints mirror the operator form:
//! - `POST /preview`            — validate + price the form, return the preview payload
//! - `POST /generate`           — produce quote documents, return artifact refs
//! - `POST /send`               — dispatch artifacts over the selected channels
//! - `GET  /download/{file}`    — download one generated artifact
//! - `GET  /health`             — liveness probe

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use adpanel_core::{
    ArtifactRef, Customer, DocType, GenerateOutcome, LineItem, Manager, PreviewOutcome, QuoteForm,
    SendChannel, SendOutcome, WorkflowController, DELIVERY_FAILED_MESSAGE,
    GENERATION_FAILED_MESSAGE,
};
use adpanel_delivery::{AlimtalkSender, ChannelDispatcher, EmailSender};

use crate::generate::PdfGenerator;

pub type Controller =
    WorkflowController<PdfGenerator, ChannelDispatcher<EmailSender, AlimtalkSender>>;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
    pub artifact_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct QuoteFormRequest {
    #[serde(default)]
    pub doc_types: Vec<String>,
    #[serde(default)]
    pub customer: CustomerDto,
    #[serde(default)]
    pub apartments: Vec<ApartmentDto>,
    #[serde(default)]
    pub discount: serde_json::Value,
    #[serde(default)]
    pub months: serde_json::Value,
    #[serde(default)]
    pub manager: ManagerDto,
    #[serde(default)]
    pub send_methods: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerDto {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApartmentDto {
    #[serde(default)]
    pub apartment_name: String,
    #[serde(default)]
    pub monitor_count: u32,
    #[serde(default)]
    pub unit_price: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ManagerDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub artifact_refs: Vec<String>,
    #[serde(flatten)]
    pub form: QuoteFormRequest,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponseBody {
    pub success: bool,
    pub artifact_refs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub checked_at: String,
}

impl QuoteFormRequest {
    fn into_form(self) -> QuoteForm {
        let mut form = QuoteForm {
            doc_types: self.doc_types.iter().filter_map(|raw| parse_doc_type(raw)).collect(),
            customer: Customer {
                company: self.customer.company,
                name: self.customer.name,
                email: self.customer.email,
                phone: self.customer.phone,
            },
            discount_key: form_value_to_string(&self.discount),
            duration_months: form_value_to_string(&self.months),
            manager: Manager {
                name: self.manager.name,
                position: self.manager.position,
                phone: self.manager.phone,
                email: self.manager.email,
            },
            send_channels: self.send_methods.iter().filter_map(|raw| parse_channel(raw)).collect(),
            ..QuoteForm::default()
        };

        for apartment in self.apartments {
            form.line_items.add(LineItem {
                name: apartment.apartment_name,
                monitor_count: apartment.monitor_count,
                unit_price: apartment.unit_price,
            });
        }

        form
    }
}

fn parse_doc_type(raw: &str) -> Option<DocType> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "proposal" => Some(DocType::Proposal),
        "estimate" => Some(DocType::Estimate),
        _ => None,
    }
}

fn parse_channel(raw: &str) -> Option<SendChannel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "email" => Some(SendChannel::Email),
        // The form historically calls the messaging channel by its provider.
        "kakao" | "messaging" => Some(SendChannel::Messaging),
        _ => None,
    }
}

fn form_value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/preview", post(preview))
        .route("/generate", post(generate))
        .route("/send", post(send))
        .route("/download/{file}", get(download))
        .route("/health", get(health))
        .with_state(state)
}

async fn preview(
    State(state): State<AppState>,
    Json(request): Json<QuoteFormRequest>,
) -> Response {
    let form = request.into_form();
    match state.controller.preview(&form).await {
        PreviewOutcome::Ready(preview) => (StatusCode::OK, Json(preview)).into_response(),
        PreviewOutcome::Invalid(failure) => unprocessable(failure.reason()),
        PreviewOutcome::Superseded => superseded(),
    }
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<QuoteFormRequest>,
) -> Response {
    let form = request.into_form();
    match state.controller.generate(&form).await {
        GenerateOutcome::Generated(artifact_refs) => (
            StatusCode::OK,
            Json(GenerateResponseBody {
                success: true,
                artifact_refs: artifact_refs.into_iter().map(|artifact| artifact.0).collect(),
            }),
        )
            .into_response(),
        GenerateOutcome::Invalid(failure) => unprocessable(failure.reason()),
        GenerateOutcome::Failed => bad_gateway(GENERATION_FAILED_MESSAGE),
        GenerateOutcome::Superseded => superseded(),
    }
}

async fn send(State(state): State<AppState>, Json(request): Json<SendRequest>) -> Response {
    let artifact_refs: Vec<ArtifactRef> =
        request.artifact_refs.into_iter().map(ArtifactRef).collect();
    let form = request.form.into_form();

    match state.controller.send(&form, artifact_refs).await {
        SendOutcome::Completed(report) => (StatusCode::OK, Json(report)).into_response(),
        SendOutcome::Invalid(failure) => unprocessable(failure.reason()),
        SendOutcome::NotGenerated => (
            StatusCode::CONFLICT,
            Json(ErrorBody { error: "no generated documents are pending".to_string() }),
        )
            .into_response(),
        SendOutcome::Failed => bad_gateway(DELIVERY_FAILED_MESSAGE),
        SendOutcome::Superseded => superseded(),
    }
}

async fn download(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    if file.contains('/') || file.contains('\\') || file.contains("..") {
        warn!(file = %file, "rejected artifact download with path separators");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody { error: "invalid artifact name".to_string() }),
        )
            .into_response();
    }

    let path = state.artifact_dir.join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = if file.ends_with(".pdf") {
                "application/pdf"
            } else {
                "text/html; charset=utf-8"
            };
            (
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{file}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody { error: "artifact not found".to_string() }),
        )
            .into_response(),
    }
}

async fn health() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "ok", checked_at: Utc::now().to_rfc3339() }))
}

fn unprocessable(reason: &str) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody { error: reason.to_string() }))
        .into_response()
}

fn bad_gateway(message: &str) -> Response {
    (StatusCode::BAD_GATEWAY, Json(ErrorBody { error: message.to_string() })).into_response()
}

fn superseded() -> Response {
    (
        StatusCode::CONFLICT,
        Json(ErrorBody { error: "request superseded by a newer one".to_string() }),
    )
        .into_response()
}
