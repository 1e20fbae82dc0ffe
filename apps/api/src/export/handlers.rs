//! Axum route handlers for the Export API.

use axum::{
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::export::raster::VisualTree;
use crate::export::ExportFormat;
use crate::models::resume::ResumeDocument;
use crate::state::AppState;

const EXPORT_ID_HEADER: HeaderName = HeaderName::from_static("x-export-id");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub resume_data: ResumeDocument,
    pub template_id: Option<String>,
    pub visual_tree: Option<VisualTree>,
}

/// POST /api/v1/export/:format
///
/// Serializes the resume and returns it as an attachment. A copy is kept on disk only when
/// `EXPORT_DIR` is set. `format` is `pdf`, `word` or `text`; PDF needs `visualTree`.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse()?;
    if let Some(id) = request.template_id.as_deref() {
        if state.templates.get(id).is_none() {
            warn!(
                template_id = id,
                default = state.templates.default_id(),
                "Unknown template, exporting with the default"
            );
        }
    }
    let (template, style) = state.templates.resolve(request.template_id.as_deref());

    let (payload, delivered) = state
        .exporter
        .export(
            &request.resume_data,
            &template,
            &style,
            format,
            request.visual_tree.as_ref(),
        )
        .await?;

    let disposition = HeaderValue::from_str(&content_disposition(&payload.filename))
        .map_err(|e| AppError::ExportFailed(format!("invalid filename header: {e}")))?;
    let export_id = HeaderValue::from_str(&delivered.export_id.to_string())
        .map_err(|e| AppError::ExportFailed(format!("invalid export id header: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(payload.mime_type)),
            (header::CONTENT_DISPOSITION, disposition),
            (EXPORT_ID_HEADER, export_id),
        ],
        Bytes::from(payload.bytes),
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback name and an RFC 5987 UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
