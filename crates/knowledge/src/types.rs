//! Core types for the evidence store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable unit of indexed source text with its provenance.
///
/// The identity key `doc_id:chunk_id` is unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceChunk {
    pub doc_id: String,

    /// Original file name the chunk was cut from
    #[serde(default)]
    pub source_name: String,

    /// 1-based page number, absent for unpaginated sources
    #[serde(default)]
    pub page: Option<u32>,

    pub chunk_id: String,

    pub text: String,
}

impl EvidenceChunk {
    /// Citation key identifying this chunk.
    pub fn key(&self) -> String {
        format!("{}:{}", self.doc_id, self.chunk_id)
    }
}

/// Description of how a store was built, persisted as `manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreManifest {
    /// Embedding provider used at build time
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Number of rows in the row table
    pub row_count: usize,

    /// Build timestamp
    pub built_at: DateTime<Utc>,
}

/// Options for building a store from a directory of text files.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Window size in characters
    pub chunk_chars: usize,

    /// Characters shared between consecutive windows
    pub overlap_chars: usize,

    /// Replace an existing store once the new one is built
    pub reset: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            chunk_chars: 2000,
            overlap_chars: 300,
            reset: false,
        }
    }
}

/// Statistics from an index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStats {
    pub documents_count: u32,
    pub chunks_count: u32,
    pub bytes_processed: u64,
    pub duration_secs: f64,
}
