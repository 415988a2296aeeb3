//! Answer generation with a length retry and an extractive fallback.
//!
//! ```text
//! generate ──ABSTAIN──────────────────────────────▶ Abstained
//!    │
//!    ▼
//! Drafted ──short──▶ retry ──ABSTAIN──▶ Drafted (first draft kept)
//!    │                  └───────────────▶ Retried
//!    ▼
//! still short ──────────────────────────────────▶ FallenBack
//! ```
//!
//! `FallenBack` never turns into `Abstained`: once the generator has
//! produced anything other than `ABSTAIN`, the request is answered.

use crate::rag::text::{flatten_newlines, strip_citations, truncate_text, word_count};
use crate::rag::types::{AskParams, RetrievedHit, ABSTAIN};
use grounded_core::AppResult;
use grounded_llm::{LlmClient, LlmRequest};
use grounded_prompt::{build_answer_prompt, build_retry_prompt, BuiltPrompt, PromptDefinition};

/// Token floor for the retry call.
const RETRY_MIN_TOKENS: u32 = 260;

/// Characters of the top passage quoted by the fallback.
const FALLBACK_SNIPPET_CHARS: usize = 260;

const FALLBACK_PREFIX: &str = "From the sources, ";

/// Where the generated answer ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// First generation was used
    Drafted,
    /// Length retry was used
    Retried,
    /// Generated text was replaced by an excerpt of the top passage
    FallenBack,
    /// Generator declined to answer
    Abstained,
}

impl DraftState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftState::Drafted => "drafted",
            DraftState::Retried => "retried",
            DraftState::FallenBack => "fallen_back",
            DraftState::Abstained => "abstained",
        }
    }
}

/// Citation-free answer text and how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub state: DraftState,

    /// `ABSTAIN` when abstained, otherwise text without citation markers
    pub text: String,
}

/// Drives the generation backend for one request.
pub struct AnswerGenerator<'a> {
    llm: &'a dyn LlmClient,
    model: &'a str,
    prompt: &'a PromptDefinition,
}

impl<'a> AnswerGenerator<'a> {
    pub fn new(llm: &'a dyn LlmClient, model: &'a str, prompt: &'a PromptDefinition) -> Self {
        Self { llm, model, prompt }
    }

    /// Generate an answer to `question` from `context`.
    ///
    /// `top_hit` is the best-ranked passage, quoted if generation stays
    /// too short. Backend failures propagate unchanged.
    pub async fn generate(
        &self,
        question: &str,
        context: &str,
        top_hit: &RetrievedHit,
        params: &AskParams,
    ) -> AppResult<GeneratedAnswer> {
        let first_prompt = build_answer_prompt(self.prompt, question, context)?;
        let first = self.complete(&first_prompt, params.max_new_tokens).await?;

        if first == ABSTAIN {
            return Ok(GeneratedAnswer {
                state: DraftState::Abstained,
                text: ABSTAIN.to_string(),
            });
        }

        let mut state = DraftState::Drafted;
        let mut draft = strip_citations(&first);
        let words = word_count(&draft);
        tracing::debug!("First draft: {} words (minimum {})", words, params.min_words);

        if words < params.min_words {
            let retry_prompt = build_retry_prompt(self.prompt, &first_prompt, params.min_words)?;
            let retry = self
                .complete(&retry_prompt, params.max_new_tokens.max(RETRY_MIN_TOKENS))
                .await?;

            if retry == ABSTAIN {
                tracing::debug!("Retry abstained, keeping first draft");
            } else {
                state = DraftState::Retried;
                draft = strip_citations(&retry);
                tracing::debug!("Retried draft: {} words", word_count(&draft));
            }
        }

        if word_count(&draft) < params.min_words {
            state = DraftState::FallenBack;
            draft = format!(
                "{}{}",
                FALLBACK_PREFIX,
                truncate_text(&flatten_newlines(&top_hit.chunk.text), FALLBACK_SNIPPET_CHARS)
            );
        }

        Ok(GeneratedAnswer { state, text: draft })
    }

    async fn complete(&self, prompt: &BuiltPrompt, max_tokens: u32) -> AppResult<String> {
        let mut request = LlmRequest::new(prompt.user.clone(), self.model)
            .with_max_tokens(max_tokens)
            .deterministic();
        if let Some(system) = &prompt.system {
            request = request.with_system(system.clone());
        }
        tracing::debug!("Generating from {} (max {} tokens)", prompt.prompt_id, max_tokens);

        let response = self.llm.complete(&request).await?;
        tracing::debug!(
            "{} returned {} chars using {} tokens",
            response.model,
            response.content.len(),
            response.usage.total()
        );
        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{chunk, ScriptedLlm};

    fn top_hit(text: &str) -> RetrievedHit {
        RetrievedHit {
            score: 0.8,
            chunk: chunk("doc1", "c0001", None, text),
        }
    }

    async fn run(replies: &[&str], top_text: &str) -> (GeneratedAnswer, usize) {
        let llm = ScriptedLlm::new(replies);
        let prompt = PromptDefinition::builtin_answer();
        let context = "SOURCE [doc1:c0001] (page=n/a): text";
        let answer = AnswerGenerator::new(&llm, "test-model", &prompt)
            .generate("question", context, &top_hit(top_text), &AskParams::default())
            .await
            .unwrap();
        (answer, llm.call_count())
    }

    #[tokio::test]
    async fn test_long_first_draft_is_drafted() {
        let (answer, calls) = run(
            &["  One two three four five six seven eight [doc1:c0001]  "],
            "unused",
        )
        .await;
        assert_eq!(answer.state, DraftState::Drafted);
        assert_eq!(answer.text, "One two three four five six seven eight");
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_abstain_is_terminal() {
        let (answer, calls) = run(&[" ABSTAIN\n"], "unused").await;
        assert_eq!(answer.state, DraftState::Abstained);
        assert_eq!(answer.text, ABSTAIN);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_short_draft_retried() {
        let (answer, calls) = run(
            &["Too short.", "Now the answer has more than enough words in it."],
            "unused",
        )
        .await;
        assert_eq!(answer.state, DraftState::Retried);
        assert_eq!(answer.text, "Now the answer has more than enough words in it.");
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_still_short_falls_back_to_top_hit() {
        let text = format!("First line\nsecond line {}", "word ".repeat(80));
        let (answer, _) = run(&["Short.", "ABSTAIN"], &text).await;

        assert_eq!(answer.state, DraftState::FallenBack);
        assert!(answer.text.starts_with("From the sources, First line second line word"));
        assert!(answer.text.ends_with(" ..."));
        assert_eq!(
            answer.text.chars().count(),
            FALLBACK_PREFIX.len() + FALLBACK_SNIPPET_CHARS + " ...".len()
        );
    }
}
