//! Quote document generation.
//!
//! Documents are rendered from Tera templates and converted to PDF through
//! an external `wkhtmltopdf` binary when one is available. Without it the
//! rendered HTML itself becomes the artifact, which browsers print fine.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{error, info, warn};

use adpanel_core::config::GenerationConfig;
use adpanel_core::{
    format_currency, render_preview, ArtifactRef, DocType, DocumentGenerator, GenerationError,
    GenerationResponse, Quote, QuoteTotals,
};

/// Register custom Tera filters used by the document templates.
///
/// - `money`: comma-grouped integer amounts, e.g. `{{ totals.final_total | money }}`
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("money", tera_money_filter);
}

fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let amount = value.as_u64().unwrap_or(0);
    Ok(tera::Value::String(format_currency(amount)))
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct PdfGenerator {
    tera: Tera,
    output_dir: PathBuf,
    wkhtmltopdf_path: Option<String>,
}

impl PdfGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, PdfError> {
        let tera = match &config.template_dir {
            Some(dir) => {
                let mut tera = Tera::new(&format!("{}/**/*", dir.display()))
                    .map_err(|error| PdfError::Template(error.to_string()))?;
                register_template_filters(&mut tera);
                tera
            }
            None => embedded_templates()?,
        };

        let wkhtmltopdf_path = config
            .wkhtmltopdf_path
            .clone()
            .or_else(|| which::which("wkhtmltopdf").ok().map(|p| p.to_string_lossy().to_string()));

        if let Some(path) = &wkhtmltopdf_path {
            info!(path = %path, "wkhtmltopdf found");
        } else {
            warn!("wkhtmltopdf not found in PATH - artifacts will be rendered HTML");
        }

        Ok(Self { tera, output_dir: config.output_dir.clone(), wkhtmltopdf_path })
    }

    /// Embedded templates and no PDF conversion; used by tests.
    pub fn with_embedded_templates(output_dir: PathBuf) -> Self {
        let tera = embedded_templates().expect("embedded templates are valid");
        Self { tera, output_dir, wkhtmltopdf_path: None }
    }

    fn template_name(doc_type: DocType) -> &'static str {
        match doc_type {
            DocType::Proposal => "proposal.html.tera",
            DocType::Estimate => "estimate.html.tera",
        }
    }

    fn render_html(
        &self,
        doc_type: DocType,
        quote: &Quote,
        totals: &QuoteTotals,
    ) -> Result<String, PdfError> {
        let mut context = Context::new();
        context.insert("document", &render_preview(quote, totals));
        context.insert("totals", totals);

        self.tera
            .render(Self::template_name(doc_type), &context)
            .map_err(|error| PdfError::Template(error.to_string()))
    }

    async fn write_artifact(
        &self,
        doc_type: DocType,
        html: &str,
    ) -> Result<ArtifactRef, PdfError> {
        let stem = format!(
            "{}_{}",
            doc_type.label().to_ascii_lowercase(),
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );

        if let Some(wkhtmltopdf) = &self.wkhtmltopdf_path {
            let pdf_path = self.output_dir.join(format!("{stem}.pdf"));
            match self.convert_html_to_pdf(html, wkhtmltopdf, &pdf_path).await {
                Ok(()) => return Ok(ArtifactRef(pdf_path.to_string_lossy().to_string())),
                Err(error) => {
                    warn!(error = %error, "PDF conversion failed, falling back to HTML");
                }
            }
        }

        let html_path = self.output_dir.join(format!("{stem}.html"));
        tokio::fs::write(&html_path, html).await?;
        Ok(ArtifactRef(html_path.to_string_lossy().to_string()))
    }

    async fn convert_html_to_pdf(
        &self,
        html: &str,
        wkhtmltopdf_path: &str,
        pdf_path: &std::path::Path,
    ) -> Result<(), PdfError> {
        let html_path =
            std::env::temp_dir().join(format!("adpanel_{}.html", uuid::Uuid::new_v4()));
        tokio::fs::write(&html_path, html).await?;

        let output = Command::new(wkhtmltopdf_path)
            .arg("--page-size")
            .arg("A4")
            .arg("--margin-top")
            .arg("10mm")
            .arg("--margin-bottom")
            .arg("10mm")
            .arg("--margin-left")
            .arg("10mm")
            .arg("--margin-right")
            .arg("10mm")
            .arg("--encoding")
            .arg("utf-8")
            .arg(&html_path)
            .arg(pdf_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let _ = tokio::fs::remove_file(&html_path).await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(stderr = %stderr, "wkhtmltopdf failed");
            return Err(PdfError::Conversion(stderr.to_string()));
        }

        info!(path = %pdf_path.display(), "PDF generated");
        Ok(())
    }
}

#[async_trait]
impl DocumentGenerator for PdfGenerator {
    async fn generate(
        &self,
        quote: &Quote,
        totals: &QuoteTotals,
    ) -> Result<GenerationResponse, GenerationError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|error| GenerationError::Store(error.to_string()))?;

        let mut artifact_refs = Vec::with_capacity(quote.doc_types.len());
        for doc_type in &quote.doc_types {
            let html = self
                .render_html(*doc_type, quote, totals)
                .map_err(|error| GenerationError::Render(error.to_string()))?;
            let artifact = self
                .write_artifact(*doc_type, &html)
                .await
                .map_err(|error| GenerationError::Store(error.to_string()))?;
            artifact_refs.push(artifact);
        }

        info!(count = artifact_refs.len(), "quote documents generated");
        Ok(GenerationResponse { success: true, artifact_refs })
    }
}

fn embedded_templates() -> Result<Tera, PdfError> {
    let mut tera = Tera::default();
    register_template_filters(&mut tera);

    tera.add_raw_template(
        "proposal.html.tera",
        include_str!("../../../templates/documents/proposal.html.tera"),
    )
    .map_err(|error| PdfError::Template(error.to_string()))?;
    tera.add_raw_template(
        "estimate.html.tera",
        include_str!("../../../templates/documents/estimate.html.tera"),
    )
    .map_err(|error| PdfError::Template(error.to_string()))?;

    Ok(tera)
}
