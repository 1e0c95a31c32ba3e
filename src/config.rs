use crate::scrapers::{PipelineSettings, ReadinessPolicy};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    pub url_file: PathBuf,
    pub output_path: PathBuf,
    /// Parent of the per-category image directories
    pub image_root: PathBuf,
    pub headless: bool,
    pub user_agent: String,
    pub pipeline: PipelineSettings,
    pub tesseract_bin: PathBuf,
    pub ocr_language: String,
    pub ocr_psm: u8,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            url_file: get("URL_FILE", "url.txt").into(),
            output_path: get("OUTPUT_PATH", "output.json").into(),
            image_root: get("IMAGE_ROOT", ".").into(),
            headless: parse(&lookup, "HEADLESS", true)?,
            user_agent: get("USER_AGENT", DEFAULT_USER_AGENT),
            pipeline: PipelineSettings {
                max_attempts: parse(&lookup, "MAX_ATTEMPTS", 5)?,
                readiness: ReadinessPolicy {
                    polls_per_round: parse(&lookup, "POLLS_PER_ROUND", 10)?,
                    reload_rounds: parse(&lookup, "RELOAD_ROUNDS", 5)?,
                    poll_interval: Duration::from_millis(parse(&lookup, "POLL_INTERVAL_MS", 1000)?),
                },
                inter_url_delay: Duration::from_millis(parse(&lookup, "INTER_URL_DELAY_MS", 5000)?),
            },
            tesseract_bin: get("TESSERACT_BIN", "tesseract").into(),
            ocr_language: get("OCR_LANGUAGE", "chi_tra"),
            ocr_psm: parse(&lookup, "OCR_PSM", 7)?,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
