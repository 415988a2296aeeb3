//! Index command handler.
//!
//! Builds the evidence store from a directory of text files.

use clap::{Args, Subcommand};
use grounded_core::{config::AppConfig, AppResult};
use grounded_knowledge::{build_index, create_provider, BuildOptions};
use std::path::PathBuf;

/// Evidence store management
#[derive(Args, Debug)]
pub struct IndexCommand {
    #[command(subcommand)]
    pub action: IndexAction,
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Chunk, embed and store every .txt, .md and .pdf file under a directory
    Build(IndexBuildCommand),
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            IndexAction::Build(cmd) => cmd.execute(config).await,
        }
    }
}

/// Build the evidence store
#[derive(Args, Debug)]
pub struct IndexBuildCommand {
    /// Directory of source documents
    #[arg(long)]
    pub input: PathBuf,

    /// Characters per chunk
    #[arg(long, default_value = "2000")]
    pub chunk_chars: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, default_value = "300")]
    pub overlap_chars: usize,

    /// Replace an existing store
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexBuildCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index build command for {:?}", self.input);

        let embedder = create_provider(&config.embedding)?;
        let options = BuildOptions {
            chunk_chars: self.chunk_chars,
            overlap_chars: self.overlap_chars,
            reset: self.reset,
        };

        let store_dir = config.store_dir();
        let stats = build_index(&self.input, &store_dir, embedder.as_ref(), &options).await?;

        if self.json {
            let output = serde_json::json!({
                "store": store_dir,
                "documentsCount": stats.documents_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Indexed {} documents ({} chunks, {} bytes) in {:.2}s",
                stats.documents_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            );
        }

        Ok(())
    }
}
