//! AI insight generation over the extracted text.
//!
//! One synchronous chat-completions request per run against Groq's
//! OpenAI-compatible API. The generator never fails to its caller: every
//! failure of the network call is captured in the report's failure
//! variant and collapsed to a display string only at the UI boundary.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::pipeline::ExtractedTable;

/// Default API base for Groq's OpenAI-compatible endpoint.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

const SYSTEM_INSTRUCTION: &str =
    "You are an advanced AI specializing in reading PDF text for analysis.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Why an insight request failed. Preserved internally for logs and tests;
/// rendered for display only through [`InsightReport::display_text`].
#[derive(Debug, Error)]
pub enum InsightError {
    /// The API answered with a non-success status.
    #[error("HTTP {code}: {message}")]
    Api { code: u16, message: String },

    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("{0}")]
    Transport(String),

    /// The response parsed but carried no completion content.
    #[error("no message content in completion response")]
    MalformedResponse,
}

/// Result of one insight request. Either the model's commentary or the
/// captured failure; never propagated as an error.
#[derive(Debug)]
pub enum InsightReport {
    Commentary(String),
    Failed(InsightError),
}

impl InsightReport {
    /// Collapse the report to the string shown to the user. Failures
    /// render in place of commentary rather than aborting the run.
    pub fn display_text(&self) -> String {
        match self {
            InsightReport::Commentary(text) => text.clone(),
            InsightReport::Failed(err) => format!("Error calling Groq API: {err}"),
        }
    }

    pub fn is_commentary(&self) -> bool {
        matches!(self, InsightReport::Commentary(_))
    }
}

/// Client for the hosted chat-completions endpoint. The API key and model
/// are injected at construction; nothing is read from process-wide state
/// after startup.
pub struct InsightGenerator {
    agent: ureq::Agent,
    api_base: String,
    api_key: String,
    model: String,
}

impl InsightGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_api_base(api_key, model, GROQ_API_BASE)
    }

    pub fn with_api_base(api_key: String, model: String, api_base: impl Into<String>) -> Self {
        let agent = ureq::builder().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            api_base: api_base.into(),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate the insight commentary for a table of extracted records.
    ///
    /// Always returns a report; a failed network call is logged and
    /// carried in the failure variant. One request, one response, fully
    /// buffered; no retries, no streaming.
    pub fn generate(&self, table: &ExtractedTable) -> InsightReport {
        let combined_text = table.combined_text();
        info!(
            "requesting insight for {} record(s) ({} chars) with model {}",
            table.len(),
            combined_text.len(),
            self.model
        );
        match self.request_completion(&combined_text) {
            Ok(text) => InsightReport::Commentary(text),
            Err(err) => {
                warn!("insight request failed: {err}");
                InsightReport::Failed(err)
            }
        }
    }

    fn request_completion(&self, combined_text: &str) -> Result<String, InsightError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": build_prompt(combined_text) },
            ],
        });

        let url = format!("{}/chat/completions", self.api_base);
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_json(&payload);

        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let message = resp
                    .into_json::<serde_json::Value>()
                    .ok()
                    .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
                    .unwrap_or_else(|| format!("HTTP {code} error"));
                return Err(InsightError::Api { code, message });
            }
            Err(e) => return Err(InsightError::Transport(e.to_string())),
        };

        let body: serde_json::Value = response
            .into_json()
            .map_err(|e| InsightError::Transport(e.to_string()))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(InsightError::MalformedResponse)
    }
}

/// Embed the combined text in the fixed instructional template sent as the
/// user message.
fn build_prompt(combined_text: &str) -> String {
    format!(
        "You are an AI agent that reviews text from multiple PDF documents.\n\
         Extract important insights, summarize key points, and provide actionable recommendations.\n\
         The combined text from the PDFs is below:\n\n{combined_text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ExtractedRecord;

    fn sample_table() -> ExtractedTable {
        [ExtractedRecord {
            filename: "a.pdf".into(),
            text: "Hello\n".into(),
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn prompt_embeds_combined_text() {
        let prompt = build_prompt("Quarterly revenue grew 12%.");
        assert!(prompt.contains("Quarterly revenue grew 12%."));
        assert!(prompt.starts_with("You are an AI agent"));
    }

    #[test]
    fn failed_report_displays_error_prefix() {
        let report = InsightReport::Failed(InsightError::Transport("connection refused".into()));
        let text = report.display_text();
        assert!(text.starts_with("Error calling Groq API: "));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn commentary_displays_verbatim() {
        let report = InsightReport::Commentary("Key points: none.".into());
        assert_eq!(report.display_text(), "Key points: none.");
    }

    #[test]
    fn unreachable_endpoint_yields_failed_report() {
        // Port 9 (discard) is not listening; the connect fails immediately.
        let generator = InsightGenerator::with_api_base(
            "test-key".into(),
            "llama3-8b-8192".into(),
            "http://127.0.0.1:9",
        );
        let report = generator.generate(&sample_table());
        assert!(!report.is_commentary());
        assert!(report.display_text().starts_with("Error calling Groq API: "));
    }
}
