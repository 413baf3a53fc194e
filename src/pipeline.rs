//! Data model and run orchestration.
//!
//! One run is a strict linear sequence: collect extracted text from every
//! uploaded document, generate the insight commentary, export the
//! spreadsheet. Every stage completes before the next begins and each run
//! produces fresh instances; nothing is retained across runs.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::export;
use crate::extract::Extractor;
use crate::insight::{InsightGenerator, InsightReport};

/// One file received at the upload boundary. Consumed by a single run.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Extracted text for one document. `text` is the concatenation of every
/// page's text with a trailing newline per page, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    pub filename: String,
    pub text: String,
}

/// Ordered collection of records, one per uploaded document, in upload
/// order. No deduplication.
#[derive(Debug, Default, Serialize)]
pub struct ExtractedTable {
    records: Vec<ExtractedRecord>,
}

impl ExtractedTable {
    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record's text joined with a blank line, in table order. This
    /// is the prompt body for the insight request.
    pub fn combined_text(&self) -> String {
        self.records
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl FromIterator<ExtractedRecord> for ExtractedTable {
    fn from_iter<I: IntoIterator<Item = ExtractedRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Run the extractor over every document, in order.
///
/// `progress` is invoked with a display line for each document before its
/// extraction begins. Any per-document failure aborts the whole batch; no
/// partial table is returned.
pub fn collect(
    documents: &[UploadedDocument],
    extractor: &dyn Extractor,
    mut progress: impl FnMut(&str),
) -> Result<ExtractedTable> {
    let mut records = Vec::with_capacity(documents.len());
    for document in documents {
        let line = format!("Processing: {}", document.name);
        info!("{line}");
        progress(&line);

        let text = extractor
            .extract(&document.bytes)
            .map_err(|e| PipelineError::Extraction {
                filename: document.name.clone(),
                reason: e.to_string(),
            })?;
        records.push(ExtractedRecord {
            filename: document.name.clone(),
            text,
        });
    }
    Ok(records.into_iter().collect())
}

/// Everything one run produces for display and download.
#[derive(Debug)]
pub struct RunOutput {
    pub progress: Vec<String>,
    pub table: ExtractedTable,
    pub insight: InsightReport,
    pub artifact_bytes: Vec<u8>,
}

/// Execute one full pipeline run: collect, generate insight, export.
///
/// Zero documents is rejected up front, before any extraction, network
/// call, or filesystem write. Extraction and export failures abort the
/// run; an insight failure does not (it is carried inside the report).
pub fn run(
    documents: &[UploadedDocument],
    extractor: &dyn Extractor,
    generator: &InsightGenerator,
    export_path: &Path,
) -> Result<RunOutput> {
    if documents.is_empty() {
        return Err(PipelineError::NoDocuments);
    }

    let mut progress = Vec::with_capacity(documents.len());
    let table = collect(documents, extractor, |line| {
        progress.push(line.to_string())
    })?;

    let insight = generator.generate(&table);

    let artifact_bytes = export::export(&table, export_path)?;
    info!(
        "run complete: {} document(s), {} byte spreadsheet at {}",
        table.len(),
        artifact_bytes.len(),
        export_path.display()
    );

    Ok(RunOutput {
        progress,
        table,
        insight,
        artifact_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_text_joins_with_blank_line() {
        let table: ExtractedTable = [
            ExtractedRecord {
                filename: "a.pdf".into(),
                text: "Hello\n".into(),
            },
            ExtractedRecord {
                filename: "b.pdf".into(),
                text: "World\n".into(),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(table.combined_text(), "Hello\n\n\nWorld\n");
    }

    #[test]
    fn combined_text_of_empty_table_is_empty() {
        let table = ExtractedTable::default();
        assert_eq!(table.combined_text(), "");
    }

    #[test]
    fn combined_text_keeps_empty_record_slots() {
        let table: ExtractedTable = [
            ExtractedRecord {
                filename: "blank.pdf".into(),
                text: String::new(),
            },
            ExtractedRecord {
                filename: "b.pdf".into(),
                text: "World\n".into(),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(table.combined_text(), "\n\nWorld\n");
    }
}
