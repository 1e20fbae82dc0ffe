// LLM prompt constants for the Suggestions module.

use crate::suggestions::SuggestionKind;

pub const SUGGESTIONS_SYSTEM: &str = "You are an expert resume writer and career coach. \
    Reply with the requested content only, without preamble or numbering.";

const EXPERIENCE_PROMPT: &str = "Generate 3 professional achievement-focused bullet points \
for a resume experience section.

Requirements:
- Start with strong action verbs
- Include quantifiable metrics where possible
- Focus on impact and results
- Keep each bullet point concise (1-2 lines)

Return only the 3 bullet points, one per line, without numbering.";

const SKILLS_PROMPT: &str = "Generate 8-10 relevant professional skills.

Requirements:
- Mix of technical and soft skills
- Industry-relevant
- Modern and in-demand skills

Return only the skill names, comma-separated.";

const SUMMARY_PROMPT: &str = "Generate 3 different professional summary options for a resume.

Requirements:
- 2-3 sentences each
- Highlight key strengths and experience
- Professional tone
- Action-oriented language

Return only the 3 summaries, separated by '---'.";

pub fn build_suggestion_prompt(kind: SuggestionKind, context: &str) -> String {
    let instructions = match kind {
        SuggestionKind::Experience => EXPERIENCE_PROMPT,
        SuggestionKind::Skills => SKILLS_PROMPT,
        SuggestionKind::Summary => SUMMARY_PROMPT,
    };
    let context = context.trim();
    if context.is_empty() {
        instructions.to_string()
    } else {
        format!("{instructions}\n\nContext:\n{context}")
    }
}
