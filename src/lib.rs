//! Web-based PDF data extraction with AI-generated insights.
//!
//! One user-triggered run flows through four stages, strictly in order:
//! text extraction per uploaded PDF, tabular assembly, one synchronous
//! chat-completions request for commentary, and spreadsheet export. See
//! the module docs for each stage's contract.

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod insight;
pub mod pipeline;
pub mod server;

pub use config::AppConfig;
pub use error::PipelineError;
pub use extract::{Extractor, PdfExtractor};
pub use insight::{InsightGenerator, InsightReport};
pub use pipeline::{collect, run, ExtractedRecord, ExtractedTable, RunOutput, UploadedDocument};
