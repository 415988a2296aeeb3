//! Embedding providers for evidence chunks and queries.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
