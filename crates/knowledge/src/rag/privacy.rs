//! Refusal of queries asking for sensitive personal identifiers.

use regex::Regex;
use std::sync::OnceLock;

static SSN_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn ssn_patterns() -> &'static [Regex] {
    SSN_PATTERNS.get_or_init(|| {
        [
            r"\bmy\s+ssn\b",
            r"\bwhat\s+is\s+my\s+ssn\b",
            r"\bwhat\s+is\s+my\s+social\s+security\b",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// True when the query must be refused before any retrieval happens.
pub fn should_abstain(query: &str) -> bool {
    let lower = query.trim().to_lowercase();
    if lower.contains("social security number") {
        return true;
    }
    ssn_patterns().iter().any(|re| re.is_match(&lower))
}
