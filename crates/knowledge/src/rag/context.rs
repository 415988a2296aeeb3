//! Character-budgeted prompt context.

use crate::rag::text::truncate_text;
use crate::rag::types::RetrievedHit;

/// Labeled source block for one hit.
pub fn source_block(hit: &RetrievedHit, max_chunk_chars: usize) -> String {
    let page = hit
        .chunk
        .page
        .map(|p| p.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "SOURCE [{}] (page={}): {}",
        hit.key(),
        page,
        truncate_text(&hit.chunk.text, max_chunk_chars)
    )
}

/// Pack source blocks in ranked order within `max_context_chars`.
///
/// A block that would overflow the budget is skipped and later, smaller
/// blocks may still fit. Separators do not count against the budget.
pub fn build_context(
    hits: &[RetrievedHit],
    max_chunk_chars: usize,
    max_context_chars: usize,
) -> String {
    let mut blocks = Vec::new();
    let mut used = 0usize;

    for hit in hits {
        let block = source_block(hit, max_chunk_chars);
        let len = block.chars().count();
        if used + len > max_context_chars {
            tracing::debug!(
                "Skipping {} ({} chars over budget)",
                hit.key(),
                used + len - max_context_chars
            );
            continue;
        }
        used += len;
        blocks.push(block);
    }

    tracing::debug!("Context: {} blocks, {} chars", blocks.len(), used);

    blocks.join("\n\n")
}
