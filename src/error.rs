//! Error types for one pipeline run.
//!
//! Everything before the insight stage is fail-fast: extraction problems
//! abort the whole run with no partial table. The insight call is the one
//! place that degrades gracefully and is therefore absent here; its
//! failures live inside [`crate::insight::InsightReport`].

use thiserror::Error;

/// All errors that can abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The triggering action was invoked with no documents.
    #[error("no documents uploaded")]
    NoDocuments,

    /// A document could not be parsed as a PDF.
    #[error("failed to extract text from {filename}: {reason}")]
    Extraction { filename: String, reason: String },

    /// The spreadsheet could not be written to or read back from disk.
    #[error("spreadsheet export failed: {0}")]
    ExportIo(#[from] std::io::Error),

    /// The workbook archive could not be assembled.
    #[error("spreadsheet export failed: {0}")]
    ExportZip(#[from] zip::result::ZipError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
