use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::template::Template;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesResponse {
    pub default_template_id: String,
    pub templates: Vec<Template>,
}

/// GET /api/v1/templates
/// Lists template metadata and the configured default.
pub async fn templates_handler(State(state): State<AppState>) -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        default_template_id: state.templates.default_id().to_string(),
        templates: state.templates.templates(),
    })
}
