use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tera::Error> for ReportError {
    fn from(e: tera::Error) -> Self {
        ReportError::TemplateRender(e.to_string())
    }
}
