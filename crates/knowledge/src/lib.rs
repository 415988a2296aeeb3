//! Evidence store and grounded answering.
//!
//! - [`store`]: row table, vector index and embedder opened as one handle
//! - [`builder`]: offline indexing of a directory of text, Markdown and PDF files
//! - [`rag`]: the answering pipeline that turns a query and retrieved
//!   evidence into a cited answer or an abstention

pub mod builder;
pub mod chunker;
pub mod embeddings;
pub mod extract;
pub mod index;
pub mod rag;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use builder::build_index;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use rag::{AnswerEngine, AnswerResult, AskParams, HealthStatus};
pub use store::{EvidenceStore, RowTable};
pub use types::{BuildOptions, BuildStats, EvidenceChunk, StoreManifest};
pub use vector_index::{FlatIndex, VectorIndex};
