//! Raster export: paints the already-laid-out preview into a bitmap and embeds it in a PDF.
//!
//! # Pipeline
//! 1. Locate the preview root (`resume-preview-content`) in the supplied `VisualTree`.
//! 2. Rasterize it through a `RenderBackend` at `RasterOptions::scale` (2× by default).
//! 3. Flatten onto an opaque page ground (white, or the template's page colour).
//! 4. Slice into A4-proportioned pages (or one tall page) and write each slice as a
//!    full-width JPEG image on its own PDF page.
//!
//! Layout is never computed here: the editor sends positioned fills and bitmaps.
//! Rasterization and encoding are CPU-bound and run inside `tokio::task::spawn_blocking`.

use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Pixel, Rgb, RgbImage, Rgba, RgbaImage};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::template::{Color, TemplateStyle};

/// Id of the element the editor renders the resume preview into.
pub const PREVIEW_ROOT_ID: &str = "resume-preview-content";

/// ISO A4 in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

const MM_TO_PT: f32 = 72.0 / 25.4;
/// Upper bound on either side of the oversampled bitmap, in pixels.
const MAX_RASTER_DIMENSION: u32 = 16_384;
/// Upper bound on the oversampled bitmap area (256 MiB as RGBA).
const MAX_RASTER_PIXELS: u64 = 1 << 26;
/// Largest page side most PDF readers accept (14 400 user units), in millimetres.
const MAX_PAGE_SIDE_MM: f32 = 14_400.0 / MM_TO_PT;

// ────────────────────────────────────────────────────────────────────────────
// Visual tree (input)
// ────────────────────────────────────────────────────────────────────────────

/// The laid-out visual state of the editor, as captured by the browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualTree {
    pub roots: Vec<VisualRoot>,
}

impl VisualTree {
    /// Finds the designated preview root.
    pub fn preview_root(&self) -> Result<&VisualRoot, AppError> {
        self.roots
            .iter()
            .find(|r| r.id == PREVIEW_ROOT_ID)
            .ok_or_else(|| {
                AppError::RenderTargetNotFound(format!(
                    "no '{PREVIEW_ROOT_ID}' element in the visual tree"
                ))
            })
    }
}

/// One laid-out subtree. Sizes and positions are CSS pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualRoot {
    pub id: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

/// A painted layer, in paint order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Layer {
    /// Solid rectangle (section rules, header bands).
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// Pre-rendered pixels (text runs, icons), base64 PNG or JPEG, optionally as a data URL.
    Bitmap {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        data: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

/// How a bitmap taller than one A4 page is laid onto PDF pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pagination {
    /// Split across as many A4 pages as needed.
    Paged,
    /// One A4-wide page as tall as the content.
    Single,
}

/// What the exported page is painted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundPolicy {
    /// Opaque white, whatever the on-screen theme.
    White,
    /// The template's page background.
    Theme,
}

impl FromStr for Pagination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paged" => Ok(Pagination::Paged),
            "single" => Ok(Pagination::Single),
            other => Err(format!("expected 'paged' or 'single', got '{other}'")),
        }
    }
}

impl FromStr for BackgroundPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(BackgroundPolicy::White),
            "theme" => Ok(BackgroundPolicy::Theme),
            other => Err(format!("expected 'white' or 'theme', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RasterOptions {
    pub scale: f32,
    pub pagination: Pagination,
    pub background: BackgroundPolicy,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            pagination: Pagination::Paged,
            background: BackgroundPolicy::White,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid raster size {width}x{height}")]
    Dimensions { width: u32, height: u32 },

    #[error("bitmap layer {index} is not valid base64: {source}")]
    Base64 {
        index: usize,
        source: base64::DecodeError,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Turns one laid-out root into pixels. `scale` is the oversampling factor over CSS pixels.
pub trait RenderBackend: Send + Sync {
    fn rasterize(
        &self,
        root: &VisualRoot,
        scale: f32,
        ground: Option<Color>,
    ) -> Result<RgbaImage, RasterError>;
}

/// Paints fills and bitmap layers in order onto a canvas of the scaled root size.
pub struct CompositingBackend;

impl RenderBackend for CompositingBackend {
    fn rasterize(
        &self,
        root: &VisualRoot,
        scale: f32,
        ground: Option<Color>,
    ) -> Result<RgbaImage, RasterError> {
        let width = scaled(root.width, scale);
        let height = scaled(root.height, scale);
        if width == 0
            || height == 0
            || width > MAX_RASTER_DIMENSION
            || height > MAX_RASTER_DIMENSION
            || width as u64 * height as u64 > MAX_RASTER_PIXELS
        {
            return Err(RasterError::Dimensions { width, height });
        }

        let base = ground.map(to_rgba).unwrap_or(Rgba([0, 0, 0, 0]));
        let mut canvas = RgbaImage::from_pixel(width, height, base);

        for (index, layer) in root.layers.iter().enumerate() {
            match layer {
                Layer::Fill {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => fill_rect(&mut canvas, (*x, *y, *width, *height), scale, *color),
                Layer::Bitmap {
                    x,
                    y,
                    width,
                    height,
                    data,
                } => {
                    let bytes = decode_bitmap(data)
                        .map_err(|source| RasterError::Base64 { index, source })?;
                    let decoded = image::load_from_memory(&bytes)?.to_rgba8();
                    let dest = DeviceRect {
                        x: device_offset(*x, scale),
                        y: device_offset(*y, scale),
                        width: scaled(*width, scale),
                        height: scaled(*height, scale),
                    };
                    paint_bitmap(&mut canvas, &decoded, dest);
                }
            }
        }

        Ok(canvas)
    }
}

fn scaled(css_px: f32, scale: f32) -> u32 {
    if !css_px.is_finite() || css_px <= 0.0 {
        return 0;
    }
    (css_px * scale).round().min(u32::MAX as f32) as u32
}

fn device_offset(css_px: f32, scale: f32) -> i64 {
    let v = (css_px * scale).round();
    if v.is_finite() {
        v as i64
    } else {
        0
    }
}

/// Destination of a bitmap layer on the canvas, in device pixels. May extend past the canvas.
#[derive(Debug, Clone, Copy)]
struct DeviceRect {
    x: i64,
    y: i64,
    width: u32,
    height: u32,
}

/// Resamples only the part of `source` that lands on the canvas, so the work and memory are
/// bounded by the canvas size whatever size the layer declares.
fn paint_bitmap(canvas: &mut RgbaImage, source: &RgbaImage, dest: DeviceRect) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = source.dimensions();
    if dest.width == 0 || dest.height == 0 || sw == 0 || sh == 0 {
        return;
    }

    let vx0 = dest.x.max(0);
    let vy0 = dest.y.max(0);
    let vx1 = dest.x.saturating_add(dest.width as i64).min(cw as i64);
    let vy1 = dest.y.saturating_add(dest.height as i64).min(ch as i64);
    if vx0 >= vx1 || vy0 >= vy1 {
        return;
    }

    // Visible span in source pixels.
    let to_src = |offset: i64, dest_len: u32, src_len: u32, round_up: bool| -> u32 {
        let v = offset as f64 * src_len as f64 / dest_len as f64;
        let v = if round_up { v.ceil() } else { v.floor() };
        (v.max(0.0) as u32).min(src_len)
    };
    let sx0 = to_src(vx0 - dest.x, dest.width, sw, false).min(sw - 1);
    let sy0 = to_src(vy0 - dest.y, dest.height, sh, false).min(sh - 1);
    let sx1 = to_src(vx1 - dest.x, dest.width, sw, true).max(sx0 + 1);
    let sy1 = to_src(vy1 - dest.y, dest.height, sh, true).max(sy0 + 1);

    let visible_w = (vx1 - vx0) as u32;
    let visible_h = (vy1 - vy0) as u32;
    let part = imageops::crop_imm(source, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();
    let resized = if part.dimensions() == (visible_w, visible_h) {
        part
    } else {
        imageops::resize(&part, visible_w, visible_h, FilterType::Triangle)
    };
    imageops::overlay(canvas, &resized, vx0, vy0);
}

fn to_rgba(c: Color) -> Rgba<u8> {
    Rgba([c.r, c.g, c.b, c.a])
}

fn fill_rect(canvas: &mut RgbaImage, rect: (f32, f32, f32, f32), scale: f32, color: Color) {
    let (x, y, w, h) = rect;
    let (cw, ch) = canvas.dimensions();
    let x0 = ((x * scale).floor().max(0.0) as u32).min(cw);
    let y0 = ((y * scale).floor().max(0.0) as u32).min(ch);
    let x1 = (((x + w) * scale).ceil().max(0.0) as u32).min(cw);
    let y1 = (((y + h) * scale).ceil().max(0.0) as u32).min(ch);
    let paint = to_rgba(color);

    for py in y0..y1 {
        for px in x0..x1 {
            canvas.get_pixel_mut(px, py).blend(&paint);
        }
    }
}

fn decode_bitmap(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match data.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    STANDARD.decode(payload.trim())
}

/// Composites the bitmap over an opaque ground colour.
pub fn flatten(image: &RgbaImage, ground: Color) -> RgbImage {
    let bg = [ground.r as u32, ground.g as u32, ground.b as u32];
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        let a = p[3] as u32;
        let mix = |c: u8, b: u32| ((c as u32 * a + b * (255 - a) + 127) / 255) as u8;
        Rgb([mix(p[0], bg[0]), mix(p[1], bg[1]), mix(p[2], bg[2])])
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// A horizontal band of the bitmap placed at the top of one PDF page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    pub y_px: u32,
    pub height_px: u32,
    /// Height of the band on the page, in millimetres (page width is always A4).
    pub band_height_mm: f32,
    /// Height of the PDF page itself, in millimetres.
    pub page_height_mm: f32,
}

/// Cuts a `width_px` × `height_px` bitmap into pages of A4 width.
///
/// `Single` falls back to A4 pages when one page would exceed the largest page size PDF
/// readers accept.
pub fn plan_pages(width_px: u32, height_px: u32, pagination: Pagination) -> Vec<PageSlice> {
    if width_px == 0 || height_px == 0 {
        return Vec::new();
    }
    let mm_per_px = A4_WIDTH_MM / width_px as f32;

    match pagination {
        Pagination::Single if height_px as f32 * mm_per_px <= MAX_PAGE_SIDE_MM => {
            let height_mm = height_px as f32 * mm_per_px;
            vec![PageSlice {
                y_px: 0,
                height_px,
                band_height_mm: height_mm,
                page_height_mm: height_mm,
            }]
        }
        Pagination::Single => {
            debug!(height_px, "Single page too tall for PDF readers, paginating");
            a4_slices(width_px, height_px, mm_per_px)
        }
        Pagination::Paged => a4_slices(width_px, height_px, mm_per_px),
    }
}

fn a4_slices(width_px: u32, height_px: u32, mm_per_px: f32) -> Vec<PageSlice> {
    let page_px = ((width_px as f32 * A4_HEIGHT_MM / A4_WIDTH_MM).round() as u32).max(1);
    let mut slices = Vec::new();
    let mut y = 0;
    while y < height_px {
        let band = page_px.min(height_px - y);
        slices.push(PageSlice {
            y_px: y,
            height_px: band,
            band_height_mm: band as f32 * mm_per_px,
            page_height_mm: A4_HEIGHT_MM,
        });
        y += band;
    }
    slices
}

// ────────────────────────────────────────────────────────────────────────────
// PDF encoding
// ────────────────────────────────────────────────────────────────────────────

/// Writes each slice of `bitmap` as a full-width image on its own page.
pub fn encode_pdf(bitmap: &RgbImage, slices: &[PageSlice], title: &str) -> Result<Vec<u8>, RasterError> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let info_id = alloc.bump();
    let image_name = Name(b"Im0");

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .creator(TextStr(concat!("resume-api ", env!("CARGO_PKG_VERSION"))));

    let mut page_ids = Vec::with_capacity(slices.len());
    for slice in slices {
        let page_id = alloc.bump();
        let image_id = alloc.bump();
        let content_id = alloc.bump();
        page_ids.push(page_id);

        let band = imageops::crop_imm(bitmap, 0, slice.y_px, bitmap.width(), slice.height_px)
            .to_image();
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(band).write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)?;

        let mut image = pdf.image_xobject(image_id, &jpeg);
        image.filter(Filter::DctDecode);
        image.width(bitmap.width() as i32);
        image.height(slice.height_px as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        image.finish();

        let page_w = A4_WIDTH_MM * MM_TO_PT;
        let page_h = slice.page_height_mm * MM_TO_PT;
        let band_h = slice.band_height_mm * MM_TO_PT;

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, page_w, page_h));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().x_objects().pair(image_name, image_id);
        page.finish();

        // PDF origin is bottom-left; pin the band to the top edge.
        let mut content = Content::new();
        content.save_state();
        content.transform([page_w, 0.0, 0.0, band_h, 0.0, page_h - band_h]);
        content.x_object(image_name);
        content.restore_state();
        pdf.stream(content_id, &content.finish());
    }

    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    Ok(pdf.finish())
}

// ────────────────────────────────────────────────────────────────────────────
// Exporter
// ────────────────────────────────────────────────────────────────────────────

/// Raster PDF exporter. Holds the backend and the pagination/background policies.
#[derive(Clone)]
pub struct RasterExporter {
    backend: Arc<dyn RenderBackend>,
    options: RasterOptions,
}

impl RasterExporter {
    pub fn new(backend: Arc<dyn RenderBackend>, options: RasterOptions) -> Self {
        Self { backend, options }
    }

    /// Renders the preview root of `tree` into PDF bytes.
    ///
    /// Missing root → `RenderTargetNotFound`; any backend, geometry or encoding failure →
    /// `ExportFailed`. Nothing is written anywhere; the caller owns the bytes.
    pub async fn export(
        &self,
        tree: &VisualTree,
        style: &TemplateStyle,
        title: &str,
    ) -> Result<Vec<u8>, AppError> {
        let root = tree.preview_root()?.clone();
        let backend = Arc::clone(&self.backend);
        let options = self.options;
        let (ground, root_ground) = match options.background {
            BackgroundPolicy::White => {
                if style.has_dark_page() {
                    debug!("Dark template page exported on white");
                }
                (Color::WHITE, None)
            }
            BackgroundPolicy::Theme => (
                style.page_background,
                Some(root.background.unwrap_or(style.page_background)),
            ),
        };
        let title = title.to_string();

        let (bytes, pages) = tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, usize), RasterError> {
            let rgba = backend.rasterize(&root, options.scale, root_ground)?;
            let bitmap = flatten(&rgba, ground);
            let slices = plan_pages(bitmap.width(), bitmap.height(), options.pagination);
            debug!(
                width = bitmap.width(),
                height = bitmap.height(),
                pages = slices.len(),
                "Rasterized preview"
            );
            let bytes = encode_pdf(&bitmap, &slices, &title)?;
            Ok((bytes, slices.len()))
        })
        .await
        .map_err(|e| AppError::ExportFailed(format!("raster task failed: {e}")))?
        .map_err(|e| AppError::ExportFailed(e.to_string()))?;

        info!(pages, bytes = bytes.len(), "Raster PDF encoded");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::TemplateRegistry;

    fn root(width: f32, height: f32, layers: Vec<Layer>) -> VisualRoot {
        VisualRoot {
            id: PREVIEW_ROOT_ID.to_string(),
            width,
            height,
            background: None,
            layers,
        }
    }

    fn red() -> Color {
        Color::rgb(0xff, 0, 0)
    }

    fn style(id: &str) -> TemplateStyle {
        TemplateRegistry::new("modern").unwrap().resolve(Some(id)).1
    }

    fn png_base64(color: Rgba<u8>, w: u32, h: u32) -> String {
        let img = RgbaImage::from_pixel(w, h, color);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_missing_preview_root_is_render_target_not_found() {
        let tree = VisualTree {
            roots: vec![VisualRoot {
                id: "sidebar".to_string(),
                ..root(10.0, 10.0, vec![])
            }],
        };
        assert!(matches!(
            tree.preview_root(),
            Err(AppError::RenderTargetNotFound(_))
        ));
    }

    #[test]
    fn test_compositing_oversamples_and_paints_fills() {
        let r = root(
            20.0,
            20.0,
            vec![Layer::Fill {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                color: red(),
            }],
        );
        let img = CompositingBackend.rasterize(&r, 2.0, None).unwrap();
        assert_eq!(img.dimensions(), (40, 40));
        assert_eq!(img.get_pixel(5, 5), &Rgba([0xff, 0, 0, 0xff]));
        assert_eq!(img.get_pixel(30, 30)[3], 0);
    }

    #[test]
    fn test_fill_outside_canvas_is_clipped() {
        let r = root(
            10.0,
            10.0,
            vec![Layer::Fill {
                x: -5.0,
                y: 8.0,
                width: 100.0,
                height: 100.0,
                color: red(),
            }],
        );
        let img = CompositingBackend.rasterize(&r, 1.0, None).unwrap();
        assert_eq!(img.get_pixel(0, 9), &Rgba([0xff, 0, 0, 0xff]));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_bitmap_layer_is_decoded_and_positioned() {
        let data = format!(
            "data:image/png;base64,{}",
            png_base64(Rgba([0, 0, 0xff, 0xff]), 10, 10)
        );
        let r = root(
            10.0,
            10.0,
            vec![Layer::Bitmap {
                x: 5.0,
                y: 5.0,
                width: 5.0,
                height: 5.0,
                data,
            }],
        );
        let img = CompositingBackend.rasterize(&r, 2.0, None).unwrap();
        assert_eq!(img.get_pixel(15, 15), &Rgba([0, 0, 0xff, 0xff]));
        assert_eq!(img.get_pixel(2, 2)[3], 0);
    }

    #[test]
    fn test_bitmap_layer_is_resampled_to_scaled_size() {
        let r = root(
            8.0,
            8.0,
            vec![Layer::Bitmap {
                x: 0.0,
                y: 0.0,
                width: 4.0,
                height: 4.0,
                data: png_base64(Rgba([0, 0xff, 0, 0xff]), 2, 2),
            }],
        );
        let img = CompositingBackend.rasterize(&r, 2.0, None).unwrap();
        // 2x2 source stretched over 8x8 device pixels.
        assert!(img.get_pixel(7, 7)[1] > 0xf0);
        assert_eq!(img.get_pixel(9, 9)[3], 0);
    }

    #[test]
    fn test_oversized_bitmap_layer_is_clipped_to_canvas() {
        let r = root(
            10.0,
            10.0,
            vec![Layer::Bitmap {
                x: 0.0,
                y: 0.0,
                width: 200_000.0,
                height: 200_000.0,
                data: png_base64(Rgba([0, 0, 0xff, 0xff]), 1, 1),
            }],
        );
        let img = CompositingBackend.rasterize(&r, 2.0, None).unwrap();
        assert_eq!(img.dimensions(), (20, 20));
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0xff, 0xff]));
        assert_eq!(img.get_pixel(19, 19), &Rgba([0, 0, 0xff, 0xff]));
    }

    #[test]
    fn test_bitmap_layer_partly_off_canvas_keeps_visible_part() {
        // Left half red, right half green; placed so only the right half is visible.
        let mut src = RgbaImage::from_pixel(2, 1, Rgba([0xff, 0, 0, 0xff]));
        src.put_pixel(1, 0, Rgba([0, 0xff, 0, 0xff]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(src)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let r = root(
            4.0,
            4.0,
            vec![Layer::Bitmap {
                x: -4.0,
                y: 0.0,
                width: 8.0,
                height: 4.0,
                data: STANDARD.encode(bytes),
            }],
        );
        let img = CompositingBackend.rasterize(&r, 1.0, None).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0xff, 0, 0xff]));
        assert_eq!(img.get_pixel(3, 3), &Rgba([0, 0xff, 0, 0xff]));
    }

    #[test]
    fn test_bitmap_layer_entirely_off_canvas_is_skipped() {
        let r = root(
            10.0,
            10.0,
            vec![Layer::Bitmap {
                x: 1.0e30,
                y: 0.0,
                width: 5.0,
                height: 5.0,
                data: png_base64(Rgba([0, 0, 0xff, 0xff]), 1, 1),
            }],
        );
        let img = CompositingBackend.rasterize(&r, 2.0, None).unwrap();
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_root_area_is_capped() {
        // Each side is under the per-side limit, the area is not.
        let r = root(10_000.0, 10_000.0, vec![]);
        assert!(matches!(
            CompositingBackend.rasterize(&r, 1.0, None),
            Err(RasterError::Dimensions { .. })
        ));
    }

    #[tokio::test]
    async fn test_export_with_oversized_layer_completes() {
        let exporter = RasterExporter::new(Arc::new(CompositingBackend), RasterOptions::default());
        let tree = VisualTree {
            roots: vec![root(
                50.0,
                50.0,
                vec![Layer::Bitmap {
                    x: 0.0,
                    y: 0.0,
                    width: 200_000.0,
                    height: 200_000.0,
                    data: png_base64(Rgba([0, 0, 0xff, 0xff]), 1, 1),
                }],
            )],
        };
        let bytes = exporter
            .export(&tree, &style("modern"), "Jane Smith - Resume")
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_bad_base64_is_an_error() {
        let r = root(
            10.0,
            10.0,
            vec![Layer::Bitmap {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                data: "!!not base64!!".to_string(),
            }],
        );
        assert!(matches!(
            CompositingBackend.rasterize(&r, 2.0, None),
            Err(RasterError::Base64 { index: 0, .. })
        ));
    }

    #[test]
    fn test_zero_sized_root_is_rejected() {
        let r = root(0.0, 100.0, vec![]);
        assert!(matches!(
            CompositingBackend.rasterize(&r, 2.0, None),
            Err(RasterError::Dimensions { .. })
        ));
    }

    #[test]
    fn test_flatten_paints_transparency_white() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let flat = flatten(&img, Color::WHITE);
        assert_eq!(flat.get_pixel(1, 1), &Rgb([0xff, 0xff, 0xff]));
    }

    #[test]
    fn test_paged_plan_splits_into_a4_bands() {
        // 420px wide → 594px per A4 page.
        let slices = plan_pages(420, 1500, Pagination::Paged);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].y_px, 0);
        assert_eq!(slices[1].y_px, 594);
        assert_eq!(slices[2].height_px, 1500 - 2 * 594);
        assert!(slices.iter().all(|s| s.page_height_mm == A4_HEIGHT_MM));
        assert!((slices[0].band_height_mm - A4_HEIGHT_MM).abs() < 0.5);
    }

    #[test]
    fn test_single_plan_derives_height_from_aspect_ratio() {
        let slices = plan_pages(420, 1500, Pagination::Single);
        assert_eq!(slices.len(), 1);
        assert!((slices[0].page_height_mm - 750.0).abs() < 0.01);
    }

    #[test]
    fn test_single_plan_too_tall_for_readers_falls_back_to_a4_pages() {
        // 100x8000 CSS px at 2x: one page would be ~16 800 mm tall.
        let slices = plan_pages(200, 16_000, Pagination::Single);
        assert!(slices.len() > 1);
        assert!(slices.iter().all(|s| s.page_height_mm == A4_HEIGHT_MM));
        assert!(slices
            .iter()
            .all(|s| s.page_height_mm * MM_TO_PT <= 14_400.0));
        let covered: u32 = slices.iter().map(|s| s.height_px).sum();
        assert_eq!(covered, 16_000);
    }

    #[test]
    fn test_single_plan_at_reader_limit_stays_one_page() {
        // 210 px wide → 1 mm per px.
        let slices = plan_pages(210, 5_000, Pagination::Single);
        assert_eq!(slices.len(), 1);
        assert!(slices[0].page_height_mm * MM_TO_PT <= 14_400.0);
    }

    #[test]
    fn test_short_document_fits_one_page() {
        let slices = plan_pages(800, 600, Pagination::Paged);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].height_px, 600);
    }

    #[test]
    fn test_encoded_pdf_has_one_page_per_slice() {
        let bitmap = RgbImage::from_pixel(42, 150, Rgb([0xff, 0xff, 0xff]));
        let slices = plan_pages(42, 150, Pagination::Paged);
        let bytes = encode_pdf(&bitmap, &slices, "Jane Smith - Resume").unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-"));
        assert!(text.contains("/Count 3"));
        assert!(text.contains("/DCTDecode"));
    }

    #[tokio::test]
    async fn test_export_produces_pdf_for_preview_root() {
        let exporter = RasterExporter::new(Arc::new(CompositingBackend), RasterOptions::default());
        let tree = VisualTree {
            roots: vec![root(
                100.0,
                140.0,
                vec![Layer::Fill {
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 20.0,
                    color: Color::rgb(0x25, 0x63, 0xeb),
                }],
            )],
        };
        let bytes = exporter
            .export(&tree, &style("modern"), "Jane Smith - Resume")
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_export_without_tree_root_fails_before_rendering() {
        let exporter = RasterExporter::new(Arc::new(CompositingBackend), RasterOptions::default());
        let result = exporter
            .export(&VisualTree::default(), &style("modern"), "x")
            .await;
        assert!(matches!(result, Err(AppError::RenderTargetNotFound(_))));
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_as_export_failed() {
        let exporter = RasterExporter::new(Arc::new(CompositingBackend), RasterOptions::default());
        let tree = VisualTree {
            roots: vec![root(-1.0, 10.0, vec![])],
        };
        let result = exporter.export(&tree, &style("modern"), "x").await;
        assert!(matches!(result, Err(AppError::ExportFailed(_))));
    }

    #[test]
    fn test_theme_policy_keeps_dark_template_ground() {
        let bold = style("bold");
        let img = CompositingBackend
            .rasterize(&root(4.0, 4.0, vec![]), 1.0, Some(bold.page_background))
            .unwrap();
        let flat = flatten(&img, bold.page_background);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_visual_tree_deserializes_tagged_layers() {
        let json = r##"{
            "roots": [{
                "id": "resume-preview-content",
                "width": 800, "height": 1100,
                "background": "#000000",
                "layers": [
                    {"kind": "fill", "x": 0, "y": 0, "width": 800, "height": 120, "color": "#2563eb"},
                    {"kind": "bitmap", "x": 0, "y": 0, "width": 10, "height": 10, "data": "AAAA"}
                ]
            }]
        }"##;
        let tree: VisualTree = serde_json::from_str(json).unwrap();
        let root = tree.preview_root().unwrap();
        assert_eq!(root.layers.len(), 2);
        assert!(matches!(root.layers[0], Layer::Fill { .. }));
        assert_eq!(root.background, Some(Color::rgb(0, 0, 0)));
    }
}
