//! Retrieval adapter and score gate.

use crate::rag::types::{AllowedCitationSet, RetrievedHit};
use crate::store::EvidenceStore;
use grounded_core::AppResult;

/// Embed the query once, search once, and materialize the ranked hits.
///
/// Hits keep the index order. The returned allow-list holds exactly the
/// keys of these hits.
pub async fn retrieve(
    store: &EvidenceStore,
    query: &str,
    top_k: usize,
) -> AppResult<(Vec<RetrievedHit>, AllowedCitationSet)> {
    let vector = store.embed(query).await?;
    let results = store.search(&vector, top_k)?;

    let hits = results
        .into_iter()
        .map(|(score, row_id)| {
            Ok(RetrievedHit {
                score,
                chunk: store.row(row_id)?.clone(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    if !hits.is_empty() {
        let scores: Vec<f32> = hits.iter().map(|h| h.score).collect();
        tracing::debug!("Retrieved {} hits, scores: {:?}", hits.len(), scores);
    }

    let allowed = AllowedCitationSet::from_hits(&hits);
    if allowed.is_empty() {
        tracing::debug!("No citable evidence for query");
    } else {
        tracing::debug!("{} citable keys", allowed.len());
    }
    Ok((hits, allowed))
}

/// True when the best hit reaches `min_score` (inclusive).
///
/// Only the first hit is consulted; weaker hits further down never
/// cause an abstention on their own.
pub fn passes_threshold(hits: &[RetrievedHit], min_score: f32) -> bool {
    hits.first().map(|h| h.score >= min_score).unwrap_or(false)
}
