mod assembler;
mod config;
mod error;
mod imaging;
mod models;
mod normalize;
mod ocr;
mod pipeline;
mod scrapers;
#[cfg(test)]
mod testing;

use anyhow::Context;
use config::Config;
use ocr::TesseractRecognizer;
use pipeline::{read_url_list, ListingPipeline};
use scrapers::{ChromeSession, TokioPoller};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🏠 Rental Scout - 591 listing extractor");

    let cfg = Config::from_env()?;
    let urls = read_url_list(&cfg.url_file).await?;
    info!("Loaded {} URLs from {}", urls.len(), cfg.url_file.display());

    let session = ChromeSession::launch(&cfg)?;
    let recognizer = TesseractRecognizer::new(&cfg.tesseract_bin, &cfg.ocr_language, cfg.ocr_psm);
    let poller = TokioPoller;

    let mut pipeline = ListingPipeline::new(
        &session,
        &recognizer,
        &poller,
        cfg.pipeline.clone(),
        &cfg.image_root,
    );
    let records = pipeline.run(&urls).await;

    // Four-space indentation, non-ASCII left as is
    let mut json = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut json, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    tokio::fs::write(&cfg.output_path, json)
        .await
        .with_context(|| format!("Failed to write {}", cfg.output_path.display()))?;
    info!("💾 Saved {} listings to {}", records.len(), cfg.output_path.display());

    Ok(())
}
