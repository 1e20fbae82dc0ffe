//! Template metadata and the typed style mapping used by the visual export.
//!
//! Templates never change document structure, only its theme. The registry is an explicit
//! lookup table; unknown ids resolve to the configured default entry (`DEFAULT_TEMPLATE`,
//! `modern` unless overridden), which must itself be present in the table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An sRGB colour with alpha, written as `#rrggbb` or `#rrggbbaa` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xff
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("colour '{s}' must start with '#'"))?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(format!("colour '{s}' must be #rrggbb or #rrggbbaa"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid colour '{s}'"))
        };
        Ok(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 0xff },
        })
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Template metadata as shown in the template picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Visual theme of a template. Consumed only by the raster export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStyle {
    pub page_background: Color,
    pub header_background: Color,
    pub header_text: Color,
    pub accent: Color,
    pub text: Color,
}

impl TemplateStyle {
    /// True when the on-screen page is dark enough that a forced white export changes its look.
    pub fn has_dark_page(&self) -> bool {
        let c = self.page_background;
        let luma = 0.2126 * c.r as f32 + 0.7152 * c.g as f32 + 0.0722 * c.b as f32;
        luma < 128.0
    }
}

struct TemplateEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    style: TemplateStyle,
}

const TEMPLATES: &[TemplateEntry] = &[
    TemplateEntry {
        id: "modern",
        name: "Modern",
        description: "Clean and contemporary design",
        style: TemplateStyle {
            page_background: Color::WHITE,
            header_background: Color::rgb(0x25, 0x63, 0xeb),
            header_text: Color::WHITE,
            accent: Color::rgb(0x25, 0x63, 0xeb),
            text: Color::rgb(0x37, 0x41, 0x51),
        },
    },
    TemplateEntry {
        id: "classic",
        name: "Classic",
        description: "Traditional professional layout",
        style: TemplateStyle {
            page_background: Color::WHITE,
            header_background: Color::WHITE,
            header_text: Color::rgb(0x1f, 0x29, 0x37),
            accent: Color::rgb(0x1f, 0x29, 0x37),
            text: Color::rgb(0x37, 0x41, 0x51),
        },
    },
    TemplateEntry {
        id: "creative",
        name: "Creative",
        description: "Stand out with bold design",
        style: TemplateStyle {
            page_background: Color::rgb(0xfa, 0xf5, 0xff),
            header_background: Color::rgb(0x93, 0x33, 0xea),
            header_text: Color::WHITE,
            accent: Color::rgb(0xdb, 0x27, 0x77),
            text: Color::rgb(0x37, 0x41, 0x51),
        },
    },
    TemplateEntry {
        id: "minimal",
        name: "Minimal",
        description: "Simple and elegant",
        style: TemplateStyle {
            page_background: Color::WHITE,
            header_background: Color::WHITE,
            header_text: Color::rgb(0x11, 0x18, 0x27),
            accent: Color::rgb(0x11, 0x18, 0x27),
            text: Color::rgb(0x4b, 0x55, 0x63),
        },
    },
    TemplateEntry {
        id: "professional",
        name: "Professional",
        description: "Corporate-friendly format",
        style: TemplateStyle {
            page_background: Color::WHITE,
            header_background: Color::rgb(0x11, 0x18, 0x27),
            header_text: Color::WHITE,
            accent: Color::rgb(0x11, 0x18, 0x27),
            text: Color::rgb(0x37, 0x41, 0x51),
        },
    },
    TemplateEntry {
        id: "bold",
        name: "Bold",
        description: "Make a strong impression",
        style: TemplateStyle {
            page_background: Color::rgb(0x00, 0x00, 0x00),
            header_background: Color::rgb(0xfa, 0xcc, 0x15),
            header_text: Color::rgb(0x00, 0x00, 0x00),
            accent: Color::rgb(0xfa, 0xcc, 0x15),
            text: Color::rgb(0xd1, 0xd5, 0xdb),
        },
    },
    TemplateEntry {
        id: "executive",
        name: "Executive",
        description: "Premium design for senior roles",
        style: TemplateStyle {
            page_background: Color::rgb(0xf9, 0xfa, 0xfb),
            header_background: Color::rgb(0x1e, 0x29, 0x3b),
            header_text: Color::WHITE,
            accent: Color::rgb(0x1e, 0x29, 0x3b),
            text: Color::rgb(0x1f, 0x29, 0x37),
        },
    },
];

/// Explicit template → style lookup with a single named default entry.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    default_id: &'static str,
}

impl TemplateRegistry {
    /// Builds the registry, failing if `default_id` names no known template.
    pub fn new(default_id: &str) -> Result<Self, String> {
        let entry = TEMPLATES
            .iter()
            .find(|t| t.id == default_id)
            .ok_or_else(|| format!("default template '{default_id}' is not a known template"))?;
        Ok(Self {
            default_id: entry.id,
        })
    }

    pub fn default_id(&self) -> &str {
        self.default_id
    }

    pub fn templates(&self) -> Vec<Template> {
        TEMPLATES.iter().map(to_template).collect()
    }

    pub fn get(&self, id: &str) -> Option<Template> {
        TEMPLATES.iter().find(|t| t.id == id).map(to_template)
    }

    /// Resolves a template id (or none) to its template and style, falling back to the
    /// default entry for unknown ids.
    pub fn resolve(&self, id: Option<&str>) -> (Template, TemplateStyle) {
        let entry = id
            .and_then(|id| TEMPLATES.iter().find(|t| t.id == id))
            .unwrap_or_else(|| self.default_entry());
        (to_template(entry), entry.style)
    }

    fn default_entry(&self) -> &'static TemplateEntry {
        TEMPLATES
            .iter()
            .find(|t| t.id == self.default_id)
            .unwrap_or(&TEMPLATES[0])
    }
}

fn to_template(entry: &TemplateEntry) -> Template {
    Template {
        id: entry.id.to_string(),
        name: entry.name.to_string(),
        description: entry.description.to_string(),
    }
}
