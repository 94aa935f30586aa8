use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use adpanel_core::config::AppConfig;
use adpanel_core::WorkflowController;
use adpanel_delivery::{AlimtalkSender, ChannelDispatcher, EmailSender};

use crate::generate::{PdfError, PdfGenerator};
use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("document generator initialization failed: {0}")]
    Generator(#[from] PdfError),
    #[error("artifact directory could not be created: {0}")]
    ArtifactDir(#[source] std::io::Error),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!("starting application bootstrap");

    std::fs::create_dir_all(&config.generation.output_dir)
        .map_err(BootstrapError::ArtifactDir)?;
    let generator = PdfGenerator::new(&config.generation)?;

    let dispatcher = ChannelDispatcher::new(
        EmailSender::new(config.email.clone()),
        AlimtalkSender::new(config.messaging.clone()),
        config.server.public_base_url.clone(),
    );
    info!(
        email_configured = config.email.is_configured(),
        messaging_configured = config.messaging.is_configured(),
        "delivery channels initialized"
    );

    let controller = Arc::new(WorkflowController::new(generator, dispatcher));
    let state = AppState { controller, artifact_dir: config.generation.output_dir.clone() };

    Ok(Application { config, state })
}
