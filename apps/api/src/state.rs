use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::ats::scorer::{AtsScorer, KeywordAtsScorer, LlmAtsScorer};
use crate::config::{Config, ScorerBackend};
use crate::export::coordinator::ExportCoordinator;
use crate::export::delivery::{Delivery, FsDelivery, ResponseDelivery};
use crate::export::raster::{CompositingBackend, RasterExporter, RasterOptions};
use crate::llm_client::{self, LlmClient};
use crate::models::template::TemplateRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub templates: TemplateRegistry,
    /// Pluggable ATS scorer. Default: KeywordAtsScorer. Swap via ATS_SCORER.
    pub ats_scorer: Arc<dyn AtsScorer>,
    /// Absent without ANTHROPIC_API_KEY; suggestions then fail with LLM_ERROR.
    pub llm: Option<LlmClient>,
    pub exporter: ExportCoordinator,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let templates = TemplateRegistry::new(&config.default_template)
            .map_err(|e| anyhow!(e))
            .context("Invalid DEFAULT_TEMPLATE")?;

        let llm = match &config.anthropic_api_key {
            Some(key) => {
                let client = LlmClient::new(key.clone()).context("Failed to build LLM client")?;
                info!("LLM client initialized (model: {})", llm_client::MODEL);
                Some(client)
            }
            None => {
                info!("ANTHROPIC_API_KEY not set; AI suggestions disabled");
                None
            }
        };

        let ats_scorer: Arc<dyn AtsScorer> = match (config.ats_scorer, &llm) {
            (ScorerBackend::Keyword, _) => Arc::new(KeywordAtsScorer),
            (ScorerBackend::Llm, Some(client)) => Arc::new(LlmAtsScorer(client.clone())),
            (ScorerBackend::Llm, None) => {
                return Err(anyhow!("ATS_SCORER=llm requires ANTHROPIC_API_KEY"));
            }
        };

        let raster = RasterExporter::new(
            Arc::new(CompositingBackend),
            RasterOptions {
                pagination: config.pdf_pagination,
                background: config.export_background,
                ..RasterOptions::default()
            },
        );
        let delivery: Arc<dyn Delivery> = match &config.export_dir {
            Some(dir) => {
                info!(
                    "Keeping exports in {} for {}h",
                    dir.display(),
                    config.export_retention.as_secs() / 3600
                );
                Arc::new(FsDelivery::new(dir, config.export_retention))
            }
            None => Arc::new(ResponseDelivery),
        };
        let exporter = ExportCoordinator::new(raster, delivery);

        Ok(AppState {
            templates,
            ats_scorer,
            llm,
            exporter,
        })
    }
}
