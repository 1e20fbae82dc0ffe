// Export pipeline: plain text, Word-compatible markup, and raster PDF.
// Serializers are pure; delivery of the finished payload goes through `delivery::Delivery`.

pub mod coordinator;
pub mod delivery;
pub mod handlers;
pub mod markup;
pub mod raster;
pub mod text;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Output formats offered by the export dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Word,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "doc",
            ExportFormat::Text => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Word => "application/msword",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ExportFormat::Pdf),
            "word" => Ok(ExportFormat::Word),
            "text" => Ok(ExportFormat::Text),
            other => Err(AppError::Validation(format!(
                "Unsupported export format '{other}' (expected pdf, word or text)"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "word",
            ExportFormat::Text => "text",
        };
        f.write_str(s)
    }
}

/// A finished export, ready to hand to a delivery mechanism.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `<FullName>_Resume.<ext>` with every whitespace run collapsed to one underscore.
pub fn export_filename(full_name: &str, format: ExportFormat) -> String {
    let mut stem = String::with_capacity(full_name.len());
    let mut in_space = false;
    for c in full_name.chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else if !is_reserved_filename_char(c) {
            stem.push(c);
            in_space = false;
        }
    }
    format!("{stem}_Resume.{}", format.extension())
}

// Path separators and control characters would let a name escape the export directory.
fn is_reserved_filename_char(c: char) -> bool {
    c.is_control() || matches!(c, '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|')
}

/// Drops control characters that would corrupt a text or markup file. `\n` and `\t` are kept;
/// `\r` is dropped so line breaks stay single `\n`.
pub fn strip_control_chars(value: &str) -> std::borrow::Cow<'_, str> {
    if value.chars().all(|c| !c.is_control() || c == '\n' || c == '\t') {
        return std::borrow::Cow::Borrowed(value);
    }
    std::borrow::Cow::Owned(
        value
            .chars()
            .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
            .collect(),
    )
}
