//! Axum route handlers for the ATS API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::ats::scorer::AtsReport;
use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsAnalyzeRequest {
    #[serde(default)]
    pub resume_data: ResumeDocument,
    #[serde(default)]
    pub job_description: String,
}

/// POST /api/v1/ai/ats/analyze
///
/// Scores the resume against a job description with the configured scorer backend.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AtsAnalyzeRequest>,
) -> Result<Json<AtsReport>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }

    let report = state
        .ats_scorer
        .analyze(&request.resume_data, &request.job_description)
        .await?;

    info!(
        backend = state.ats_scorer.backend(),
        score = report.score,
        "ATS analysis served"
    );

    Ok(Json(report))
}
