//! Ask command handler.
//!
//! Answers one question from the evidence store and prints the answer
//! with its citations, or `ABSTAIN`.

use clap::Args;
use grounded_core::{config::AppConfig, AppResult};
use grounded_knowledge::{AnswerResult, AskParams};

use super::open_engine;

/// Answer a question from the evidence store
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Hits retrieved from the index (1-50)
    #[arg(short = 'k', long, default_value = "10")]
    pub top_k: usize,

    /// Citations attached to the answer (1-10)
    #[arg(long, default_value = "2")]
    pub cite_k: usize,

    /// Abstain unless the best hit scores at least this much
    #[arg(long, default_value = "0.35")]
    pub min_score: f32,

    /// Character budget for the sources block
    #[arg(long, default_value = "6500")]
    pub max_context_chars: usize,

    /// Characters kept per source
    #[arg(long, default_value = "900")]
    pub max_chunk_chars: usize,

    /// Token limit for the first generation
    #[arg(long, default_value = "220")]
    pub max_new_tokens: u32,

    /// Shorter answers are retried, then replaced by an excerpt
    #[arg(long, default_value = "8")]
    pub min_words: usize,

    /// Print evidence previews alongside the answer
    #[arg(long)]
    pub include_evidence: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let engine = open_engine(config)?;
        let result = engine.ask(&self.query, &self.params()).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_text(&result);
        }

        Ok(())
    }

    fn params(&self) -> AskParams {
        AskParams {
            top_k: self.top_k,
            cite_k: self.cite_k,
            include_evidence: self.include_evidence,
            min_score: self.min_score,
            max_context_chars: self.max_context_chars,
            max_chunk_chars: self.max_chunk_chars,
            max_new_tokens: self.max_new_tokens,
            min_words: self.min_words,
        }
    }
}

fn print_text(result: &AnswerResult) {
    println!("{}", result.answer);

    if !result.evidence.is_empty() {
        println!();
        println!("Evidence:");
        for (i, e) in result.evidence.iter().enumerate() {
            let page = e
                .page
                .map(|p| format!(" p.{}", p))
                .unwrap_or_default();
            println!(
                "  {}. [{}:{}]{} ({:.3}) {}",
                i + 1,
                e.doc_id,
                e.chunk_id,
                page,
                e.score,
                e.text_preview
            );
        }
    }
}
