//! Export coordinator: picks the serializer for a format, names the file, delivers it.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::export::delivery::{Delivered, Delivery};
use crate::export::raster::{RasterExporter, VisualTree};
use crate::export::{export_filename, markup, text, ExportFormat, ExportPayload};
use crate::models::resume::ResumeDocument;
use crate::models::template::{Template, TemplateStyle};

#[derive(Clone)]
pub struct ExportCoordinator {
    raster: RasterExporter,
    delivery: Arc<dyn Delivery>,
}

impl ExportCoordinator {
    pub fn new(raster: RasterExporter, delivery: Arc<dyn Delivery>) -> Self {
        Self { raster, delivery }
    }

    /// Produces the payload for `format` without delivering it.
    ///
    /// The visual tree is only consulted for PDF; text and markup ignore the template.
    pub async fn render(
        &self,
        doc: &ResumeDocument,
        style: &TemplateStyle,
        format: ExportFormat,
        visual_tree: Option<&VisualTree>,
    ) -> Result<ExportPayload, AppError> {
        let filename = export_filename(&doc.personal_info.full_name, format);

        let bytes = match format {
            ExportFormat::Text => text::serialize(doc).into_bytes(),
            ExportFormat::Word => markup::serialize(doc).into_bytes(),
            ExportFormat::Pdf => {
                let tree = visual_tree.ok_or_else(|| {
                    AppError::RenderTargetNotFound(
                        "PDF export needs the rendered preview (visualTree)".to_string(),
                    )
                })?;
                let title = format!("{} - Resume", doc.personal_info.full_name);
                self.raster.export(tree, style, &title).await?
            }
        };

        Ok(ExportPayload {
            filename,
            mime_type: format.mime_type(),
            bytes,
        })
    }

    /// Renders and delivers. On any failure nothing is delivered.
    pub async fn export(
        &self,
        doc: &ResumeDocument,
        template: &Template,
        style: &TemplateStyle,
        format: ExportFormat,
        visual_tree: Option<&VisualTree>,
    ) -> Result<(ExportPayload, Delivered), AppError> {
        let payload = match self.render(doc, style, format, visual_tree).await {
            Ok(p) => p,
            Err(e) => {
                warn!(%format, template = %template.id, "Export failed before delivery: {e}");
                return Err(e);
            }
        };

        let delivered = self.delivery.deliver(&payload).await?;

        info!(
            export_id = %delivered.export_id,
            %format,
            template = %template.id,
            filename = %payload.filename,
            bytes = payload.bytes.len(),
            "Resume exported"
        );

        Ok((payload, delivered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::delivery::{DeliveryError, FsDelivery, ResponseDelivery};
    use std::time::Duration;
    use crate::export::raster::{CompositingBackend, RasterOptions, VisualRoot, PREVIEW_ROOT_ID};
    use crate::models::resume::PersonalInfo;
    use crate::models::template::TemplateRegistry;
    use async_trait::async_trait;

    struct FailingDelivery;

    #[async_trait]
    impl Delivery for FailingDelivery {
        async fn deliver(&self, _payload: &ExportPayload) -> Result<Delivered, DeliveryError> {
            Err(DeliveryError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn coordinator(delivery: Arc<dyn Delivery>) -> ExportCoordinator {
        let raster = RasterExporter::new(Arc::new(CompositingBackend), RasterOptions::default());
        ExportCoordinator::new(raster, delivery)
    }

    fn jane() -> ResumeDocument {
        ResumeDocument {
            personal_info: PersonalInfo {
                full_name: "Jane   Smith".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn modern() -> (Template, TemplateStyle) {
        TemplateRegistry::new("modern").unwrap().resolve(Some("modern"))
    }

    fn preview_tree() -> VisualTree {
        VisualTree {
            roots: vec![VisualRoot {
                id: PREVIEW_ROOT_ID.to_string(),
                width: 120.0,
                height: 160.0,
                background: None,
                layers: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn test_text_export_is_delivered_under_derived_name() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(Arc::new(FsDelivery::new(dir.path(), DAY)));
        let (template, style) = modern();

        let (payload, delivered) = coordinator
            .export(&jane(), &template, &style, ExportFormat::Text, None)
            .await
            .unwrap();

        assert_eq!(payload.filename, "Jane_Smith_Resume.txt");
        assert_eq!(payload.mime_type, "text/plain; charset=utf-8");
        assert_eq!(delivered.filename, "Jane_Smith_Resume.txt");
        let saved = std::fs::read_to_string(
            dir.path()
                .join(delivered.export_id.to_string())
                .join("Jane_Smith_Resume.txt"),
        )
        .unwrap();
        assert_eq!(saved, "Jane   Smith\n | \n\n\n");
    }

    #[tokio::test]
    async fn test_default_delivery_returns_payload_without_storing() {
        let coordinator = coordinator(Arc::new(ResponseDelivery));
        let (template, style) = modern();

        let (payload, delivered) = coordinator
            .export(&jane(), &template, &style, ExportFormat::Text, None)
            .await
            .unwrap();

        assert_eq!(payload.bytes, b"Jane   Smith\n | \n\n\n");
        assert!(delivered.location.is_none());
        assert_eq!(delivered.bytes, payload.bytes.len());
    }

    #[tokio::test]
    async fn test_word_export_uses_msword_type_and_doc_extension() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(Arc::new(FsDelivery::new(dir.path(), DAY)));
        let (_, style) = modern();

        let payload = coordinator
            .render(&jane(), &style, ExportFormat::Word, None)
            .await
            .unwrap();

        assert_eq!(payload.filename, "Jane_Smith_Resume.doc");
        assert_eq!(payload.mime_type, "application/msword");
        assert!(payload.bytes.starts_with(b"<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn test_pdf_export_renders_preview() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(Arc::new(FsDelivery::new(dir.path(), DAY)));
        let (template, style) = modern();

        let (payload, delivered) = coordinator
            .export(&jane(), &template, &style, ExportFormat::Pdf, Some(&preview_tree()))
            .await
            .unwrap();

        assert_eq!(payload.filename, "Jane_Smith_Resume.pdf");
        assert!(payload.bytes.starts_with(b"%PDF-"));
        assert!(delivered.location.unwrap().ends_with("Jane_Smith_Resume.pdf"));
    }

    #[tokio::test]
    async fn test_pdf_without_tree_fails_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(Arc::new(FsDelivery::new(dir.path(), DAY)));
        let (template, style) = modern();

        let result = coordinator
            .export(&jane(), &template, &style, ExportFormat::Pdf, None)
            .await;

        assert!(matches!(result, Err(AppError::RenderTargetNotFound(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_surfaces_as_export_failed() {
        let coordinator = coordinator(Arc::new(FailingDelivery));
        let (template, style) = modern();

        let result = coordinator
            .export(&jane(), &template, &style, ExportFormat::Text, None)
            .await;

        assert!(matches!(result, Err(AppError::ExportFailed(_))));
    }
}
