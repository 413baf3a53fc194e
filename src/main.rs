use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pdfinsight::config::{AppConfig, Args};
use pdfinsight::insight::InsightGenerator;
use pdfinsight::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::resolve(Args::parse())?;

    let generator = InsightGenerator::with_api_base(
        config.api_key.clone(),
        config.model.clone(),
        config.api_base.clone(),
    );

    let state = AppState {
        generator: Arc::new(generator),
        export_path: config.export_path.clone(),
    };

    server::serve(config.bind, state).await
}
