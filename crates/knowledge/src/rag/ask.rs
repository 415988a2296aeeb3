//! Grounded answering orchestration.
//!
//! privacy gate → retrieval → score gate → definition rerank →
//! (definition shortcut | context + generation) → citations

use crate::rag::citations::{attach_citations, select_citations};
use crate::rag::context::build_context;
use crate::rag::definition::{definition_shortcut, detect_acronym, rerank_for_definition};
use crate::rag::generate::AnswerGenerator;
use crate::rag::privacy;
use crate::rag::retrieve::{passes_threshold, retrieve};
use crate::rag::types::{AnswerResult, AskParams, EvidencePreview, HealthStatus, ABSTAIN};
use crate::store::EvidenceStore;
use grounded_core::{AppError, AppResult};
use grounded_llm::LlmClient;
use grounded_prompt::PromptDefinition;
use std::sync::Arc;
use tracing::instrument;

/// Immutable answering context built once at startup.
///
/// Cheap to clone and safe to share across concurrent requests; every
/// request works on its own hits and citation set.
#[derive(Clone)]
pub struct AnswerEngine {
    store: Arc<EvidenceStore>,
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: Arc<PromptDefinition>,
}

impl AnswerEngine {
    pub fn new(
        store: Arc<EvidenceStore>,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
    ) -> Self {
        Self {
            store,
            llm,
            model: model.into(),
            prompt: Arc::new(prompt),
        }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            ready: !self.store.is_empty(),
            evidence_row_count: self.store.len(),
        }
    }

    /// Answer `query` from the evidence store, or abstain.
    ///
    /// Invalid parameters are rejected before any backend call. Backend
    /// failures are returned as errors, never as abstentions.
    #[instrument(skip_all, fields(top_k = params.top_k, cite_k = params.cite_k))]
    pub async fn ask(&self, query: &str, params: &AskParams) -> AppResult<AnswerResult> {
        params.validate()?;

        let question = query.trim();
        if question.is_empty() {
            tracing::info!("Empty query, abstaining");
            return Ok(AnswerResult::abstain(query, Vec::new()));
        }

        // Refused queries are never logged
        if privacy::should_abstain(question) {
            tracing::info!("Query refused by privacy gate");
            return Ok(AnswerResult::abstain(query, Vec::new()));
        }

        tracing::debug!("Answering query: {}", question);

        let (mut hits, allowed) = retrieve(&self.store, question, params.top_k).await?;

        if !passes_threshold(&hits, params.min_score) {
            tracing::info!(
                "Abstaining: top score {:.3} below {:.3}",
                hits.first().map(|h| h.score).unwrap_or(f32::NAN),
                params.min_score
            );
            return Ok(AnswerResult::abstain(query, Vec::new()));
        }

        let acronym = detect_acronym(question);
        if let Some(acronym) = &acronym {
            tracing::debug!("Detected acronym: {}", acronym);
            rerank_for_definition(&mut hits, acronym);
        }

        let evidence: Vec<EvidencePreview> = if params.include_evidence {
            hits.iter().map(EvidencePreview::from).collect()
        } else {
            Vec::new()
        };

        if let Some(acronym) = &acronym {
            if let Some(found) = definition_shortcut(acronym, &hits, params.cite_k) {
                let cites = found
                    .citations
                    .into_iter()
                    .filter(|key| allowed.contains(key))
                    .collect();
                let (answer, citations) = attach_citations(&found.sentence, cites);
                tracing::info!("Answered {} from definition shortcut", acronym);
                return Ok(AnswerResult::answered(query, answer, citations, evidence));
            }
        }

        let top_hit = hits
            .first()
            .ok_or_else(|| AppError::Other("Score gate passed without hits".to_string()))?;
        let context = build_context(&hits, params.max_chunk_chars, params.max_context_chars);

        let generated = AnswerGenerator::new(self.llm.as_ref(), &self.model, &self.prompt)
            .generate(question, &context, top_hit, params)
            .await?;

        let citations = select_citations(&hits, &allowed, params.cite_k);
        let (answer, citations) = attach_citations(&generated.text, citations);

        tracing::info!(
            "Generated answer ({}), {} citations",
            generated.state.as_str(),
            citations.len()
        );

        if answer == ABSTAIN {
            return Ok(AnswerResult::abstain(query, evidence));
        }
        Ok(AnswerResult::answered(query, answer, citations, evidence))
    }
}
