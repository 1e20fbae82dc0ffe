// ATS compatibility analysis: keyword extraction, structural checks, scoring.
// The LLM-backed scorer goes through llm_client like every other model call.

pub mod formatting;
pub mod handlers;
pub mod keywords;
pub mod prompts;
pub mod scorer;
