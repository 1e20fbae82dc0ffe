use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::export::raster::{BackgroundPolicy, Pagination};

/// Which ATS scorer backend serves `/api/v1/ai/ats/analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerBackend {
    Keyword,
    Llm,
}

impl FromStr for ScorerBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "keyword" => Ok(ScorerBackend::Keyword),
            "llm" => Ok(ScorerBackend::Llm),
            other => Err(format!("expected 'keyword' or 'llm', got '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub default_template: String,
    /// Opt-in copy of every export on disk. Unset: exports only travel in the response.
    pub export_dir: Option<PathBuf>,
    /// How long stored exports are kept when `export_dir` is set.
    pub export_retention: Duration,
    pub pdf_pagination: Pagination,
    pub export_background: BackgroundPolicy,
    pub ats_scorer: ScorerBackend,
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: var("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            default_template: var("DEFAULT_TEMPLATE", "modern"),
            export_dir: lookup("EXPORT_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
            export_retention: Duration::from_secs(
                var("EXPORT_RETENTION_HOURS", "24")
                    .parse::<u64>()
                    .context("EXPORT_RETENTION_HOURS must be a whole number of hours")?
                    .saturating_mul(60 * 60),
            ),
            pdf_pagination: parse_choice(&var("PDF_PAGINATION", "paged"), "PDF_PAGINATION")?,
            export_background: parse_choice(&var("EXPORT_BACKGROUND", "white"), "EXPORT_BACKGROUND")?,
            ats_scorer: parse_choice(&var("ATS_SCORER", "keyword"), "ATS_SCORER")?,
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
        })
    }
}

fn parse_choice<T>(value: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .to_lowercase()
        .parse::<T>()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Invalid value for environment variable '{key}'"))
}
