//! Axum route handlers for the Suggestions API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;
use crate::suggestions::prompts::{build_suggestion_prompt, SUGGESTIONS_SYSTEM};
use crate::suggestions::{parse_suggestions, SuggestionKind};

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<String>,
}

/// POST /api/v1/ai/suggestions
///
/// Asks the LLM for section content. Rejects unknown types before any model call.
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(request): Json<SuggestionRequest>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let kind: SuggestionKind = request.kind.parse()?;

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| AppError::Llm("ANTHROPIC_API_KEY is not configured".to_string()))?;

    let prompt = build_suggestion_prompt(kind, &request.context);
    let content = llm.call_text(&prompt, SUGGESTIONS_SYSTEM).await?;
    let suggestions = parse_suggestions(kind, &content);

    info!(%kind, count = suggestions.len(), "Suggestions generated");

    Ok(Json(SuggestionResponse { suggestions }))
}
