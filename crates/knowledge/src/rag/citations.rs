//! Citation selection and attachment.
//!
//! The only place bracketed citation keys are added to generated answers.

use crate::rag::types::{AllowedCitationSet, RetrievedHit, ABSTAIN};

/// First `cite_k` distinct ranked keys that are allowed for this request.
pub fn select_citations(
    hits: &[RetrievedHit],
    allowed: &AllowedCitationSet,
    cite_k: usize,
) -> Vec<String> {
    let mut citations: Vec<String> = Vec::with_capacity(cite_k);
    for hit in hits {
        if citations.len() >= cite_k {
            break;
        }
        let key = hit.key();
        if allowed.contains(&key) && !citations.contains(&key) {
            citations.push(key);
        }
    }
    citations
}

/// Append `[key]` markers to an answer. An abstention gets none.
///
/// Returns the final answer text and the citations actually attached.
pub fn attach_citations(answer: &str, citations: Vec<String>) -> (String, Vec<String>) {
    let answer = answer.trim();
    if answer == ABSTAIN {
        return (ABSTAIN.to_string(), Vec::new());
    }

    let markers = citations
        .iter()
        .map(|key| format!("[{}]", key))
        .collect::<Vec<_>>()
        .join(" ");

    let text = if markers.is_empty() {
        answer.to_string()
    } else {
        format!("{} {}", answer, markers)
    };

    (text, citations)
}
