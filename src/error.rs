use thiserror::Error;

/// Hard failures of the analysis pipeline. Everything below these two is
/// recovered inline with defaults: a single bad label, date, or diary row
/// never fails a submission.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The uploaded document could not be decoded into text at all.
    #[error("PDF extraction failed: {0}")]
    PdfExtraction(String),

    /// The text decoded fine but the structural markers of the supported
    /// proposal layout are missing.
    #[error("this does not look like a Cvent RFP export")]
    UnrecognizedFormat,

    /// Rendering an export document failed.
    #[error("report rendering failed: {0}")]
    Render(String),
}
