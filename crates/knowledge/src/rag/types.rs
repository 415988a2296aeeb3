//! Request and response types for grounded answering.

use crate::types::EvidenceChunk;
use grounded_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Literal answer text of an abstention.
pub const ABSTAIN: &str = "ABSTAIN";

/// Characters kept in an evidence preview.
const PREVIEW_CHARS: usize = 220;

/// Per-request answering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AskParams {
    /// Hits retrieved from the index, 1..=50
    pub top_k: usize,

    /// Citations attached to an answer, 1..=10
    pub cite_k: usize,

    /// Return evidence previews alongside the answer
    pub include_evidence: bool,

    /// Abstain unless the best hit scores at least this much
    pub min_score: f32,

    pub max_context_chars: usize,

    pub max_chunk_chars: usize,

    pub max_new_tokens: u32,

    /// Answers shorter than this are retried, then replaced
    pub min_words: usize,
}

impl Default for AskParams {
    fn default() -> Self {
        Self {
            top_k: 10,
            cite_k: 2,
            include_evidence: false,
            min_score: 0.35,
            max_context_chars: 6500,
            max_chunk_chars: 900,
            max_new_tokens: 220,
            min_words: 8,
        }
    }
}

impl AskParams {
    /// Reject out-of-range parameters. Nothing is clamped.
    pub fn validate(&self) -> AppResult<()> {
        if !(1..=50).contains(&self.top_k) {
            return Err(AppError::Validation(format!(
                "top_k must be between 1 and 50, got {}",
                self.top_k
            )));
        }
        if !(1..=10).contains(&self.cite_k) {
            return Err(AppError::Validation(format!(
                "cite_k must be between 1 and 10, got {}",
                self.cite_k
            )));
        }
        if !self.min_score.is_finite() {
            return Err(AppError::Validation(
                "min_score must be a finite number".to_string(),
            ));
        }
        if self.max_context_chars == 0 {
            return Err(AppError::Validation(
                "max_context_chars must be greater than zero".to_string(),
            ));
        }
        if self.max_chunk_chars == 0 {
            return Err(AppError::Validation(
                "max_chunk_chars must be greater than zero".to_string(),
            ));
        }
        if self.max_new_tokens == 0 {
            return Err(AppError::Validation(
                "max_new_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// An evidence chunk scored against one query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedHit {
    /// Similarity from the index; reranking never changes it
    pub score: f32,
    pub chunk: EvidenceChunk,
}

impl RetrievedHit {
    pub fn key(&self) -> String {
        self.chunk.key()
    }
}

/// Citation keys retrievable for the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedCitationSet {
    keys: HashSet<String>,
}

impl AllowedCitationSet {
    pub fn from_hits(hits: &[RetrievedHit]) -> Self {
        Self {
            keys: hits.iter().map(RetrievedHit::key).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Compact view of a hit returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePreview {
    pub score: f32,
    pub doc_id: String,
    pub chunk_id: String,
    pub page: Option<u32>,
    pub text_preview: String,
}

impl From<&RetrievedHit> for EvidencePreview {
    fn from(hit: &RetrievedHit) -> Self {
        Self {
            score: hit.score,
            doc_id: hit.chunk.doc_id.clone(),
            chunk_id: hit.chunk.chunk_id.clone(),
            page: hit.chunk.page,
            text_preview: super::text::truncate_text(
                &super::text::flatten_newlines(&hit.chunk.text),
                PREVIEW_CHARS,
            ),
        }
    }
}

/// Outcome of one `ask` call.
///
/// `abstained` holds exactly when `answer == "ABSTAIN"`, and then
/// `citations` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub query: String,
    pub abstained: bool,
    pub answer: String,
    pub citations: Vec<String>,
    pub evidence: Vec<EvidencePreview>,
}

impl AnswerResult {
    pub fn abstain(query: &str, evidence: Vec<EvidencePreview>) -> Self {
        Self {
            query: query.to_string(),
            abstained: true,
            answer: ABSTAIN.to_string(),
            citations: Vec::new(),
            evidence,
        }
    }

    pub fn answered(
        query: &str,
        answer: String,
        citations: Vec<String>,
        evidence: Vec<EvidencePreview>,
    ) -> Self {
        Self {
            query: query.to_string(),
            abstained: false,
            answer,
            citations,
            evidence,
        }
    }
}

/// Readiness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ready: bool,
    #[serde(rename = "evidenceRowCount")]
    pub evidence_row_count: usize,
}
