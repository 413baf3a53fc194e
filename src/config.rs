//! Startup configuration.
//!
//! The API key is a hard startup precondition: it is read from the
//! process environment exactly once, before the server binds, and
//! injected into the insight generator at construction. Everything else
//! (bind address, model, export path, API base) comes from command-line
//! arguments with environment fallbacks.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::export::EXPORT_FILE_NAME;
use crate::insight::GROQ_API_BASE;

/// Environment variable holding the Groq API key.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Model requested from the chat-completions endpoint.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

#[derive(Debug, Parser)]
#[command(author, version, about = "Extract PDF text, generate AI insights, export to a spreadsheet")]
pub struct Args {
    /// Address to serve the web interface on
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Model identifier sent with every completion request
    #[arg(long, env = "GROQ_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the chat-completions API
    #[arg(long, env = "GROQ_API_BASE", default_value = GROQ_API_BASE)]
    pub api_base: String,

    /// Where the exported spreadsheet is written (overwritten every run)
    #[arg(long, env = "PDF_EXPORT_PATH", default_value = EXPORT_FILE_NAME)]
    pub export_path: PathBuf,
}

/// Fully resolved configuration for one server process.
#[derive(Debug)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub export_path: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from arguments and the environment.
    ///
    /// Fails when the API key is absent so the process refuses to start
    /// rather than failing on the first run.
    pub fn resolve(args: Args) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR).with_context(|| {
            format!("{API_KEY_VAR} is not set; export it before starting the server")
        })?;

        Ok(Self {
            bind: args.bind,
            api_key,
            model: args.model,
            api_base: args.api_base,
            export_path: args.export_path,
        })
    }
}
