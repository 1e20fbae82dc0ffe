//! ATS scoring. Trait-based so the deterministic keyword heuristic and the LLM-backed
//! analysis can be swapped at startup without touching handlers.
//!
//! `AppState` holds an `Arc<dyn AtsScorer>`, picked from `ATS_SCORER`.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ats::formatting::check_formatting;
use crate::ats::keywords::{extract_keywords, term_set};
use crate::ats::prompts::{build_ats_prompt, ATS_SYSTEM};
use crate::errors::AppError;
use crate::export::text;
use crate::llm_client::LlmClient;
use crate::models::resume::ResumeDocument;

pub const EXCELLENT_THRESHOLD: u32 = 80;
pub const GOOD_THRESHOLD: u32 = 60;
/// Points taken off the keyword score for each formatting finding.
pub const PENALTY_PER_ISSUE: u32 = 5;
pub const MAX_FORMATTING_PENALTY: u32 = 20;
/// Missing keywords named in the keyword-gap recommendation.
pub const MAX_KEYWORD_ADVICE: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsReport {
    pub score: u32, // 0 – 100
    pub score_description: String,
    pub missing_keywords: Vec<String>,
    pub matching_keywords: Vec<String>,
    pub recommendations: Vec<String>,
    pub formatting_issues: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait AtsScorer: Send + Sync {
    async fn analyze(
        &self,
        doc: &ResumeDocument,
        job_description: &str,
    ) -> Result<AtsReport, AppError>;

    /// Backend name, for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordAtsScorer (default)
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic keyword-overlap scorer. No network, no randomness.
pub struct KeywordAtsScorer;

#[async_trait]
impl AtsScorer for KeywordAtsScorer {
    async fn analyze(
        &self,
        doc: &ResumeDocument,
        job_description: &str,
    ) -> Result<AtsReport, AppError> {
        analyze(doc, job_description)
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmAtsScorer (opt-in)
// ────────────────────────────────────────────────────────────────────────────

/// Report shape as the model returns it, before clamping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmAtsReport {
    score: f64,
    #[serde(default)]
    missing_keywords: Vec<String>,
    #[serde(default)]
    matching_keywords: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    formatting_issues: Vec<String>,
}

/// Sends the plain-text resume and the job description to the LLM.
pub struct LlmAtsScorer(pub LlmClient);

#[async_trait]
impl AtsScorer for LlmAtsScorer {
    async fn analyze(
        &self,
        doc: &ResumeDocument,
        job_description: &str,
    ) -> Result<AtsReport, AppError> {
        require_job_description(job_description)?;

        let prompt = build_ats_prompt(&text::serialize(doc), job_description);
        let raw: LlmAtsReport = self
            .0
            .call_json(&prompt, ATS_SYSTEM)
            .await
            .map_err(|e| AppError::AnalysisFailed(e.to_string()))?;

        let score = if raw.score.is_finite() {
            raw.score.round().clamp(0.0, 100.0) as u32
        } else {
            0
        };

        let (matching_keywords, missing_keywords) =
            normalize_keyword_lists(raw.matching_keywords, raw.missing_keywords);

        Ok(AtsReport {
            score,
            score_description: score_description(score).to_string(),
            missing_keywords,
            matching_keywords,
            recommendations: raw.recommendations,
            formatting_issues: raw.formatting_issues,
        })
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core keyword heuristic
// ────────────────────────────────────────────────────────────────────────────

/// Scores `doc` against `job_description`. A pure function of its inputs.
///
/// score = clamp(round(100 · matched / max(1, total)) − min(20, 5 · issues), 0, 100)
pub fn analyze(doc: &ResumeDocument, job_description: &str) -> Result<AtsReport, AppError> {
    require_job_description(job_description)?;

    let wanted = extract_keywords(job_description);
    let have = resume_terms(doc);

    let (matching, missing): (Vec<_>, Vec<_>) =
        wanted.into_iter().partition(|k| have.contains(&k.keyword));
    let matching_keywords: Vec<String> = matching.into_iter().map(|k| k.keyword).collect();
    let missing_keywords: Vec<String> = missing.into_iter().map(|k| k.keyword).collect();

    let findings = check_formatting(doc);
    let total = matching_keywords.len() + missing_keywords.len();
    let score = compute_score(matching_keywords.len(), total, findings.len());

    let mut recommendations = Vec::with_capacity(findings.len() + 1);
    if !missing_keywords.is_empty() {
        let top: Vec<&str> = missing_keywords
            .iter()
            .take(MAX_KEYWORD_ADVICE)
            .map(String::as_str)
            .collect();
        recommendations.push(format!(
            "Add these keywords from the job description where they apply: {}",
            top.join(", ")
        ));
    }
    recommendations.extend(findings.iter().map(|f| f.advice.clone()));

    debug!(
        total,
        issues = findings.len(),
        "Keyword analysis complete"
    );
    info!(
        score,
        matched = matching_keywords.len(),
        missing = missing_keywords.len(),
        "ATS analysis"
    );

    Ok(AtsReport {
        score,
        score_description: score_description(score).to_string(),
        missing_keywords,
        matching_keywords,
        recommendations,
        formatting_issues: findings.into_iter().map(|f| f.issue).collect(),
    })
}

/// Brings model-supplied keyword lists to the keyword scorer's shape: lower-cased, blank-free,
/// deduplicated in first-seen order, and disjoint (a matched keyword is never also missing).
fn normalize_keyword_lists(
    matching: Vec<String>,
    missing: Vec<String>,
) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut clean = |list: Vec<String>| -> Vec<String> {
        list.into_iter()
            .map(|k| k.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect()
    };
    let matching = clean(matching);
    let missing = clean(missing);
    (matching, missing)
}

/// Tier message for a score. Thresholds: 80 and 60.
pub fn score_description(score: u32) -> &'static str {
    if score >= EXCELLENT_THRESHOLD {
        "Excellent! Your resume is highly ATS-compatible"
    } else if score >= GOOD_THRESHOLD {
        "Good, but there's room for improvement"
    } else {
        "Needs improvement for better ATS compatibility"
    }
}

fn require_job_description(job_description: &str) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn compute_score(matched: usize, total: usize, issues: usize) -> u32 {
    let ratio = (100.0 * matched as f64 / total.max(1) as f64).round() as i64;
    let penalty = (PENALTY_PER_ISSUE as i64 * issues as i64).min(MAX_FORMATTING_PENALTY as i64);
    (ratio - penalty).clamp(0, 100) as u32
}

/// Every free-text field a recruiter's ATS would index, tokenized per field.
fn resume_terms(doc: &ResumeDocument) -> HashSet<String> {
    let mut fragments: Vec<&str> = vec![doc.personal_info.summary.as_str()];
    for exp in &doc.experience {
        fragments.extend([exp.position.as_str(), exp.description.as_str()]);
    }
    for edu in &doc.education {
        fragments.extend([edu.degree.as_str(), edu.field.as_str()]);
    }
    fragments.extend(doc.skills.technical.iter().map(String::as_str));
    fragments.extend(doc.skills.soft.iter().map(String::as_str));
    for project in &doc.projects {
        fragments.extend([project.name.as_str(), project.description.as_str()]);
        fragments.extend(project.technologies.iter().map(String::as_str));
    }
    for cert in &doc.certifications {
        fragments.extend([cert.name.as_str(), cert.issuer.as_str()]);
    }
    fragments.extend(doc.languages.iter().map(|l| l.language.as_str()));
    term_set(fragments)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
