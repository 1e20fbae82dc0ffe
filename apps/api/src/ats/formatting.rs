use serde::{Deserialize, Serialize};

use crate::models::resume::{Experience, ResumeDocument};

/// A structural problem found in the resume, with the advice that fixes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingFinding {
    pub rule: FormattingRule,
    pub issue: String,
    pub advice: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingRule {
    IncompleteContact,
    MissingSummary,
    NoExperience,
    UndescribedExperience,
    MissingDates,
    NoQuantifiedImpact,
    NoSkills,
    NoEducation,
}

/// Runs the fixed rule set over the document structure. Independent of any job description.
///
/// Findings come back in rule order so reports are stable.
pub fn check_formatting(doc: &ResumeDocument) -> Vec<FormattingFinding> {
    let mut findings = Vec::new();
    let info = &doc.personal_info;

    if is_blank(&info.email) || is_blank(&info.phone) {
        findings.push(finding(
            FormattingRule::IncompleteContact,
            "Contact details are incomplete (email or phone missing)".to_string(),
            "Add an email address and phone number to the header so recruiters can reach you",
        ));
    }

    if is_blank(&info.summary) {
        findings.push(finding(
            FormattingRule::MissingSummary,
            "No professional summary".to_string(),
            "Add a 2-3 sentence professional summary that mirrors the role's key requirements",
        ));
    }

    if doc.experience.is_empty() {
        findings.push(finding(
            FormattingRule::NoExperience,
            "No work experience entries".to_string(),
            "Add your work history under a standard \"Work Experience\" heading",
        ));
    } else {
        let undescribed = doc
            .experience
            .iter()
            .filter(|e| is_blank(&e.description))
            .count();
        if undescribed > 0 {
            findings.push(finding(
                FormattingRule::UndescribedExperience,
                format!("{} without a description", entries(undescribed)),
                "Describe responsibilities and achievements for every role",
            ));
        }

        let undated = doc.experience.iter().filter(|e| missing_dates(e)).count();
        if undated > 0 {
            findings.push(finding(
                FormattingRule::MissingDates,
                format!("{} missing start or end dates", entries(undated)),
                "Use standard date formats (MM/YYYY) for all positions",
            ));
        }

        if !doc.experience.iter().any(|e| is_quantified(&e.description)) {
            findings.push(finding(
                FormattingRule::NoQuantifiedImpact,
                "No quantifiable metrics found in experience descriptions".to_string(),
                "Add measurable achievements with specific metrics (e.g. \"increased performance by 40%\")",
            ));
        }
    }

    if doc.skills.is_empty() {
        findings.push(finding(
            FormattingRule::NoSkills,
            "Skills section is empty".to_string(),
            "Add a skills section with both hard and soft skills mentioned in the job posting",
        ));
    }

    if doc.education.is_empty() {
        findings.push(finding(
            FormattingRule::NoEducation,
            "No education entries".to_string(),
            "Add your education, including degree and field of study",
        ));
    }

    findings
}

fn finding(rule: FormattingRule, issue: String, advice: &str) -> FormattingFinding {
    FormattingFinding {
        rule,
        issue,
        advice: advice.to_string(),
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn entries(n: usize) -> String {
    if n == 1 {
        "1 experience entry".to_string()
    } else {
        format!("{n} experience entries")
    }
}

fn missing_dates(exp: &Experience) -> bool {
    is_blank(&exp.start_date) || (!exp.current && is_blank(&exp.end_date))
}

/// Digits, percentages or currency amounts count as quantified impact.
fn is_quantified(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '%' | '$' | '€' | '£'))
}
