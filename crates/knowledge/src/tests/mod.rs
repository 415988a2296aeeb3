//! Shared fakes for pipeline tests.


use crate::embeddings::EmbeddingProvider;
use crate::rag::AnswerEngine;
use crate::store::{EvidenceStore, RowTable};
use crate::types::EvidenceChunk;
use crate::vector_index::VectorIndex;
use async_trait::async_trait;
use grounded_core::{AppError, AppResult};
use grounded_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use grounded_prompt::PromptDefinition;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DIMS: usize = 4;

/// Embedder returning a constant vector and counting calls.
#[derive(Debug, Default)]
pub struct CountingEmbedder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-v1"
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Backend("embedding service down".to_string()));
        }
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0, 0.0]).collect())
    }
}

/// Index returning preset `(score, row_id)` pairs regardless of the query.
pub struct FixedIndex {
    pub results: Vec<(f32, usize)>,
    pub rows: usize,
    pub calls: Arc<AtomicUsize>,
}

impl VectorIndex for FixedIndex {
    fn len(&self) -> usize {
        self.rows
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn search(&self, _query: &[f32], k: usize) -> AppResult<Vec<(f32, usize)>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.iter().copied().take(k).collect())
    }
}

/// Generation backend replaying scripted replies and recording requests.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<AppResult<String>>>,
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        let replies = VecDeque::from(vec![Err(AppError::Backend(
            "generation service down".to_string(),
        ))]);
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Other("no scripted reply left".to_string())))?;
        Ok(LlmResponse {
            content: reply,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

pub fn chunk(doc: &str, chunk_id: &str, page: Option<u32>, text: &str) -> EvidenceChunk {
    EvidenceChunk {
        doc_id: doc.to_string(),
        source_name: format!("{}.pdf", doc),
        page,
        chunk_id: chunk_id.to_string(),
        text: text.to_string(),
    }
}

/// Engine wired to fakes, plus handles for inspecting backend calls.
pub struct Harness {
    pub engine: AnswerEngine,
    pub embedder: Arc<CountingEmbedder>,
    pub search_calls: Arc<AtomicUsize>,
    pub llm: Arc<ScriptedLlm>,
}

impl Harness {
    /// `scored` pairs each chunk with the score the index reports for it,
    /// already in ranked order.
    pub fn new(scored: Vec<(f32, EvidenceChunk)>, llm: ScriptedLlm) -> Self {
        Self::with_embedder(scored, llm, CountingEmbedder::default())
    }

    pub fn with_embedder(
        scored: Vec<(f32, EvidenceChunk)>,
        llm: ScriptedLlm,
        embedder: CountingEmbedder,
    ) -> Self {
        let results = scored
            .iter()
            .enumerate()
            .map(|(row_id, (score, _))| (*score, row_id))
            .collect();
        let rows = RowTable::new(scored.into_iter().map(|(_, c)| c).collect()).unwrap();
        let search_calls = Arc::new(AtomicUsize::new(0));
        let index = FixedIndex {
            results,
            rows: rows.len(),
            calls: Arc::clone(&search_calls),
        };

        let embedder = Arc::new(embedder);
        let store = EvidenceStore::new(embedder.clone(), Box::new(index), rows).unwrap();
        let llm = Arc::new(llm);
        let engine = AnswerEngine::new(
            Arc::new(store),
            llm.clone(),
            "test-model",
            PromptDefinition::builtin_answer(),
        );

        Self {
            engine,
            embedder,
            search_calls,
            llm,
        }
    }

    pub fn embed_calls(&self) -> usize {
        self.embedder.calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}
