pub mod health;
pub mod templates;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::ats::handlers as ats;
use crate::errors::AppError;
use crate::export::handlers as export;
use crate::state::AppState;
use crate::suggestions::handlers as suggestions;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(templates::templates_handler))
        // AI
        .route("/api/v1/ai/ats/analyze", post(ats::handle_analyze))
        .route(
            "/api/v1/ai/suggestions",
            post(suggestions::handle_suggestions),
        )
        // Export
        .route("/api/v1/export/:format", post(export::handle_export))
        .fallback(not_found)
        .with_state(state)
}

/// Unknown paths answer with the standard error body instead of an empty 404.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
