// LLM prompt constants for the ATS module.

/// System prompt for ATS analysis. Enforces JSON-only output.
pub const ATS_SYSTEM: &str = "You are an ATS optimization expert who helps job seekers \
    improve their resumes. You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

const ATS_RESPONSE_SCHEMA: &str = r#"Return a JSON object with this EXACT schema (no extra fields):
{
  "score": 72,
  "scoreDescription": "brief description of the score",
  "missingKeywords": ["kubernetes"],
  "matchingKeywords": ["react"],
  "recommendations": ["Add measurable achievements to each role"],
  "formattingIssues": ["No professional summary"]
}

Rules:
- score is an integer between 0 and 100 reflecting keyword match, formatting and relevance
- Identify 5-8 missing keywords from the job description, most important first
- Identify 5-8 matching keywords found in the resume
- Provide 5-7 actionable recommendations, keyword advice first
- List 2-4 formatting issues, or an empty array if there are none
- Keywords are lower-case"#;

/// Builds the analysis prompt. User text is inserted once, never re-scanned for placeholders.
pub fn build_ats_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "Analyze the following resume against the job description as an Applicant Tracking \
         System would.\n\nJOB DESCRIPTION:\n{}\n\nRESUME:\n{}\n\n{ATS_RESPONSE_SCHEMA}\n",
        job_description.trim(),
        resume_text.trim_end(),
    )
}
