// AI writing suggestions for the summary, experience and skills sections.
// The model call goes through llm_client; this module owns prompts and response parsing.

pub mod handlers;
pub mod prompts;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Summary,
    Experience,
    Skills,
}

impl FromStr for SuggestionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(SuggestionKind::Summary),
            "experience" => Ok(SuggestionKind::Experience),
            "skills" => Ok(SuggestionKind::Skills),
            other => Err(AppError::Validation(format!(
                "Invalid suggestion type '{other}' (expected summary, experience or skills)"
            ))),
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuggestionKind::Summary => "summary",
            SuggestionKind::Experience => "experience",
            SuggestionKind::Skills => "skills",
        };
        f.write_str(s)
    }
}

/// Splits raw model output into individual suggestions.
///
/// Skills are comma-separated, summaries are separated by `---`, experience bullets are one
/// per line. Empty pieces are dropped.
pub fn parse_suggestions(kind: SuggestionKind, content: &str) -> Vec<String> {
    let pieces: Vec<&str> = match kind {
        SuggestionKind::Skills => content.split(',').collect(),
        SuggestionKind::Summary => content.split("---").collect(),
        SuggestionKind::Experience => content.lines().map(strip_bullet).collect(),
    };
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim_start();
    line.strip_prefix(['-', '•', '*'])
        .map(str::trim_start)
        .unwrap_or(line)
}
