//! Acronym-definition heuristics.
//!
//! Pure functions over `(query, text)`: detect an acronym the query asks
//! about, nudge passages that define it to the front, and answer directly
//! from a `Long Form Name (ACR)` match when one exists.

use crate::rag::types::RetrievedHit;
use regex::Regex;
use std::sync::OnceLock;

const PAREN_BONUS: f32 = 0.25;
const STANDS_FOR_BONUS: f32 = 0.10;

static STAND_FOR_RE: OnceLock<Option<Regex>> = OnceLock::new();
static UPPERCASE_TOKEN_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Find the acronym a query is about.
///
/// Tries "what does X stand for" first, then the first all-uppercase
/// token of 2 to 10 letters anywhere in the query.
pub fn detect_acronym(query: &str) -> Option<String> {
    let query = query.trim();

    let stand_for = STAND_FOR_RE.get_or_init(|| {
        Regex::new(r"(?i)what\s+does\s+([A-Za-z0-9\-]{2,15})\s+stand\s+for").ok()
    });
    if let Some(caps) = stand_for.as_ref().and_then(|re| re.captures(query)) {
        return caps.get(1).map(|m| m.as_str().trim().to_string());
    }

    let uppercase = UPPERCASE_TOKEN_RE.get_or_init(|| Regex::new(r"\b[A-Z]{2,10}\b").ok());
    uppercase
        .as_ref()
        .and_then(|re| re.find(query))
        .map(|m| m.as_str().to_string())
}

/// Reorder hits so passages defining `acronym` come first.
///
/// The bonus only decides order. Scores are left untouched and equal
/// boosted scores keep their original relative order.
pub fn rerank_for_definition(hits: &mut [RetrievedHit], acronym: &str) {
    let marker = format!("({})", acronym);
    let boosted = |hit: &RetrievedHit| {
        let mut bonus = 0.0;
        if hit.chunk.text.contains(&marker) {
            bonus += PAREN_BONUS;
        }
        if hit.chunk.text.to_lowercase().contains("stands for") {
            bonus += STANDS_FOR_BONUS;
        }
        hit.score + bonus
    };

    // slice::sort_by is stable
    hits.sort_by(|a, b| {
        boosted(b)
            .partial_cmp(&boosted(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Compiled `Some Long Form (ACRONYM)` matcher for one acronym.
#[derive(Debug, Clone)]
pub struct ExpansionPattern {
    re: Regex,
}

impl ExpansionPattern {
    /// `None` when the escaped pattern fails to compile.
    pub fn new(acronym: &str) -> Option<Self> {
        let pattern = format!(
            r"([A-Za-z][A-Za-z \-/]{{3,120}})\(\s*{}\s*\)",
            regex::escape(acronym)
        );
        Regex::new(&pattern).ok().map(|re| Self { re })
    }

    /// Expansion phrase in `text`, whitespace collapsed.
    pub fn find(&self, text: &str) -> Option<String> {
        let phrase = self.re.captures(text)?.get(1)?.as_str();
        Some(phrase.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

/// A definition answered straight from a retrieved passage.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionMatch {
    /// `"<ACRONYM> stands for <phrase>."`, without citations
    pub sentence: String,

    /// Matching passage first, then other ranked keys, at most `cite_k`
    pub citations: Vec<String>,
}

/// Try to answer `acronym` from the first hit that defines it.
pub fn definition_shortcut(
    acronym: &str,
    hits: &[RetrievedHit],
    cite_k: usize,
) -> Option<DefinitionMatch> {
    let pattern = ExpansionPattern::new(acronym)?;
    let (position, phrase) = hits
        .iter()
        .enumerate()
        .find_map(|(i, hit)| pattern.find(&hit.chunk.text).map(|p| (i, p)))?;

    let primary = hits[position].key();
    let mut citations = vec![primary.clone()];
    for hit in hits {
        if citations.len() >= cite_k {
            break;
        }
        let key = hit.key();
        if !citations.contains(&key) {
            citations.push(key);
        }
    }

    tracing::debug!("Definition for {} found in {}", acronym, primary);

    Some(DefinitionMatch {
        sentence: format!("{} stands for {}.", acronym, phrase),
        citations,
    })
}
