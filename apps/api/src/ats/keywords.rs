//! Keyword extraction shared by both sides of the ATS comparison.
//!
//! Text is lower-cased and split on anything that is not alphanumeric, `+` or `#` (so `c++`
//! and `c#` survive). Known multi-token terms such as `node.js` or `machine learning` are
//! joined back into one canonical term before stop-words and short tokens are dropped.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

const MIN_TERM_LEN: usize = 2;

/// Multi-token technical terms, as (canonical form, token sequence). Longest match wins.
const PHRASES: &[(&str, &[&str])] = &[
    ("test driven development", &["test", "driven", "development"]),
    ("natural language processing", &["natural", "language", "processing"]),
    ("amazon web services", &["amazon", "web", "services"]),
    ("ruby on rails", &["ruby", "on", "rails"]),
    ("node.js", &["node", "js"]),
    ("next.js", &["next", "js"]),
    ("vue.js", &["vue", "js"]),
    ("express.js", &["express", "js"]),
    ("asp.net", &["asp", "net"]),
    ("ci/cd", &["ci", "cd"]),
    ("react native", &["react", "native"]),
    ("machine learning", &["machine", "learning"]),
    ("deep learning", &["deep", "learning"]),
    ("data science", &["data", "science"]),
    ("data analysis", &["data", "analysis"]),
    ("data engineering", &["data", "engineering"]),
    ("computer science", &["computer", "science"]),
    ("computer vision", &["computer", "vision"]),
    ("rest api", &["rest", "api"]),
    ("rest api", &["rest", "apis"]),
    ("restful api", &["restful", "api"]),
    ("restful api", &["restful", "apis"]),
    ("cloud architecture", &["cloud", "architecture"]),
    ("distributed systems", &["distributed", "systems"]),
    ("system design", &["system", "design"]),
    ("project management", &["project", "management"]),
    ("product management", &["product", "management"]),
    ("problem solving", &["problem", "solving"]),
    ("unit testing", &["unit", "testing"]),
    ("version control", &["version", "control"]),
    ("google cloud", &["google", "cloud"]),
    ("user experience", &["user", "experience"]),
    ("spring boot", &["spring", "boot"]),
    ("sql server", &["sql", "server"]),
    ("power bi", &["power", "bi"]),
    ("objective c", &["objective", "c"]),
];

/// Common English words plus job-posting filler that never make useful keywords.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "been", "being", "both", "but", "by", "can", "could", "did", "do",
    "does", "each", "either", "etc", "every", "for", "from", "had", "has", "have", "having",
    "he", "her", "here", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just",
    "like", "may", "me", "more", "most", "much", "must", "my", "no", "nor", "not", "of", "on",
    "one", "only", "or", "other", "our", "ours", "out", "over", "own", "per", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "up", "upon", "us", "very", "was",
    "we", "well", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "within", "without", "would", "you", "your", "yours",
    // posting filler
    "ability", "able", "applicant", "applicants", "apply", "benefits", "bonus", "candidate",
    "candidates", "company", "competitive", "environment", "excellent", "experience",
    "experienced", "familiarity", "good", "great", "highly", "ideal", "including", "job",
    "join", "knowledge", "looking", "minimum", "new", "nice", "offer", "opportunity",
    "plus", "position", "preferred", "proficiency", "proficient", "qualifications", "required",
    "requirements", "responsibilities", "role", "salary", "seeking", "skills", "strong",
    "team", "understanding", "using", "work", "working", "year", "years",
];

/// A keyword from the job description with its frequency and first position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub frequency: u32,
    /// Index of the first occurrence among the extracted terms.
    pub first_seen: usize,
}

/// Extracts the job description's keyword set, most frequent first, ties by first appearance.
pub fn extract_keywords(text: &str) -> Vec<KeywordEntry> {
    let mut counts: HashMap<String, (u32, usize)> = HashMap::new();
    for (position, term) in terms(text).into_iter().enumerate() {
        counts
            .entry(term)
            .and_modify(|(freq, _)| *freq += 1)
            .or_insert((1, position));
    }

    let mut entries: Vec<KeywordEntry> = counts
        .into_iter()
        .map(|(keyword, (frequency, first_seen))| KeywordEntry {
            keyword,
            frequency,
            first_seen,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then(a.first_seen.cmp(&b.first_seen))
    });
    entries
}

/// The normalized term set of several independent text fragments.
///
/// Fragments are tokenized separately so a phrase never spans two fields.
pub fn term_set<'a>(fragments: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    fragments.into_iter().flat_map(terms).collect()
}

/// Normalized terms of `text`, in order, repeats included.
pub fn terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .collect();

    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if let Some((canonical, len)) = match_phrase(&tokens[i..]) {
            out.push(canonical.to_string());
            i += len;
            continue;
        }
        let token = tokens[i];
        if is_keyword_candidate(token) {
            out.push(token.to_string());
        }
        i += 1;
    }
    out
}

fn match_phrase(tokens: &[&str]) -> Option<(&'static str, usize)> {
    PHRASES
        .iter()
        .filter(|(_, seq)| seq.len() <= tokens.len() && tokens[..seq.len()] == **seq)
        .max_by_key(|(_, seq)| seq.len())
        .map(|(canonical, seq)| (*canonical, seq.len()))
}

fn is_keyword_candidate(token: &str) -> bool {
    token.chars().count() >= MIN_TERM_LEN
        && token.chars().any(|c| c.is_alphabetic())
        && !STOP_WORDS.contains(&token)
}
