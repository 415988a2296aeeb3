//! Command handlers for the Grounded CLI.

pub mod ask;
pub mod health;
pub mod index;
pub mod serve;

pub use ask::AskCommand;
pub use health::HealthCommand;
pub use index::IndexCommand;
pub use serve::ServeCommand;

use grounded_core::{config::AppConfig, AppResult};
use grounded_knowledge::{create_provider, AnswerEngine, EvidenceStore};
use grounded_llm::create_client;
use grounded_prompt::load_answer_prompt;
use std::sync::Arc;
use std::time::Duration;

/// Open the evidence store and wire the answering engine from `config`.
///
/// Fails with a configuration error when the store has not been built.
pub fn open_engine(config: &AppConfig) -> AppResult<AnswerEngine> {
    let store = open_store(config)?;

    let llm = create_client(
        &config.llm.provider,
        config.llm.endpoint.as_deref(),
        Duration::from_secs(config.llm.timeout_secs),
    )?;

    let prompt = load_answer_prompt(&config.workspace)?;
    tracing::debug!("Using prompt: {} ({})", prompt.id, prompt.api_version);

    Ok(AnswerEngine::new(
        Arc::new(store),
        llm,
        config.llm.model.clone(),
        prompt,
    ))
}

pub fn open_store(config: &AppConfig) -> AppResult<EvidenceStore> {
    let embedder = create_provider(&config.embedding)?;
    let store_dir = config.store_dir();
    tracing::debug!("Opening evidence store at {:?}", store_dir);
    EvidenceStore::open(&store_dir, embedder)
}
