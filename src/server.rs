//! HTTP boundary.
//!
//! Serves the upload form, runs the pipeline on `POST /process`, and
//! offers the exported workbook at `GET /download`. The pipeline itself
//! is synchronous (PDF parsing, the inference call, filesystem writes),
//! so each run is moved onto the blocking thread pool; the triggering
//! request blocks until the run completes.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use quick_xml::escape::escape;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::PipelineError;
use crate::export::{EXPORT_FILE_NAME, XLSX_MIME};
use crate::extract::PdfExtractor;
use crate::insight::InsightGenerator;
use crate::pipeline::{self, RunOutput, UploadedDocument};

const APP_TITLE: &str = "AI-Powered PDF Data Extractor & FP&A Assistant";

/// Cap on the total multipart body size accepted per request.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Shared state for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<InsightGenerator>,
    pub export_path: PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/process", post(process))
        .route("/download", get(download))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Bind and serve until the process is terminated.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<String> {
    let body = r#"<form action="/process" method="post" enctype="multipart/form-data">
<p><label>Upload one or more PDF files to extract data</label></p>
<p><input type="file" name="files" accept="application/pdf" multiple></p>
<p><button type="submit">Process PDFs</button></p>
</form>"#;
    Html(page(body))
}

async fn process(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut documents = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("files") {
                    continue;
                }
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload.pdf".to_string());
                match field.bytes().await {
                    Ok(bytes) if !bytes.is_empty() => documents.push(UploadedDocument {
                        name,
                        bytes: bytes.to_vec(),
                    }),
                    // A file input submitted with no selection arrives as
                    // an empty part; it is not an upload.
                    Ok(_) => {}
                    Err(e) => {
                        return error_page(
                            StatusCode::BAD_REQUEST,
                            &format!("upload failed: {e}"),
                        )
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return error_page(StatusCode::BAD_REQUEST, &format!("upload failed: {e}"))
            }
        }
    }

    if documents.is_empty() {
        return warning_page();
    }

    let generator = state.generator.clone();
    let export_path = state.export_path.clone();
    let result = tokio::task::spawn_blocking(move || {
        pipeline::run(&documents, &PdfExtractor, &generator, &export_path)
    })
    .await;

    match result {
        Ok(Ok(output)) => results_page(&state.export_path, &output),
        Ok(Err(PipelineError::NoDocuments)) => warning_page(),
        Ok(Err(err)) => {
            error!("pipeline run failed: {err}");
            error_page(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
        Err(e) => {
            error!("pipeline task failed: {e}");
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

async fn download(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.export_path).await {
        Ok(bytes) => {
            let file_name = artifact_file_name(&state.export_path);
            (
                [
                    (header::CONTENT_TYPE, XLSX_MIME.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{file_name}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(_) => error_page(
            StatusCode::NOT_FOUND,
            "no spreadsheet has been exported yet",
        ),
    }
}

// ── Rendering ──────────────────────────────────────────────────────

fn artifact_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(EXPORT_FILE_NAME)
        .to_string()
}

fn results_page(export_path: &Path, output: &RunOutput) -> Response {
    let mut body = String::new();

    for line in &output.progress {
        body.push_str(&format!("<p class=\"progress\">{}</p>\n", escape(line.as_str())));
    }

    body.push_str("<h2>Extracted Text</h2>\n<table>\n<tr><th>filename</th><th>text</th></tr>\n");
    for record in output.table.records() {
        body.push_str(&format!(
            "<tr><td>{}</td><td><pre>{}</pre></td></tr>\n",
            escape(record.filename.as_str()),
            escape(record.text.as_str())
        ));
    }
    body.push_str("</table>\n");

    body.push_str(&format!(
        "<h2>AI-Generated Commentary</h2>\n<div class=\"insight\"><pre>{}</pre></div>\n",
        escape(output.insight.display_text().as_str())
    ));

    let file_name = artifact_file_name(export_path);
    body.push_str(&format!(
        "<p class=\"success\">Data saved to {}!</p>\n<p><a href=\"/download\">Download Excel File</a></p>\n<p><a href=\"/\">Process more PDFs</a></p>",
        escape(file_name.as_str())
    ));

    Html(page(&body)).into_response()
}

fn warning_page() -> Response {
    let body = "<p class=\"warning\">Please upload at least one PDF file.</p>\n<p><a href=\"/\">Back</a></p>";
    Html(page(body)).into_response()
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<p class=\"warning\">{}</p>\n<p><a href=\"/\">Back</a></p>",
        escape(message)
    );
    (status, Html(page(&body))).into_response()
}

fn page(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 60rem; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: 0.4rem; text-align: left; vertical-align: top; }}
td pre {{ margin: 0; white-space: pre-wrap; }}
.insight {{ border: 1px solid #ccc; padding: 0.8rem; }}
.insight pre {{ margin: 0; white-space: pre-wrap; }}
.warning {{ color: #a33; }}
.success {{ color: #383; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(APP_TITLE),
        body = body
    )
}
