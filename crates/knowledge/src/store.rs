//! Evidence store: embedder, vector index and row table behind one handle.
//!
//! A store directory holds three files written together by the index builder:
//!
//! - `meta.jsonl`: one [`EvidenceChunk`] per non-empty line, row id = ordinal
//! - `vectors.sqlite`: one vector per row id
//! - `manifest.json`: embedding provider, model, dimensions and row count
//!
//! The store is loaded once at startup and only read afterwards.

use crate::embeddings::EmbeddingProvider;
use crate::index;
use crate::types::{EvidenceChunk, StoreManifest};
use crate::vector_index::{FlatIndex, VectorIndex};
use grounded_core::{AppError, AppResult};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub const ROWS_FILE: &str = "meta.jsonl";
pub const VECTORS_FILE: &str = "vectors.sqlite";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Row table mapping row ids to evidence chunks.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    rows: Vec<EvidenceChunk>,
}

impl RowTable {
    /// Build a row table, rejecting duplicate citation keys.
    pub fn new(rows: Vec<EvidenceChunk>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            let key = row.key();
            if !seen.insert(key.clone()) {
                return Err(AppError::Config(format!(
                    "Duplicate citation key in row table: {}",
                    key
                )));
            }
        }
        Ok(Self { rows })
    }

    /// Load a JSONL row table.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut rows = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: EvidenceChunk = serde_json::from_str(line).map_err(|e| {
                AppError::Config(format!(
                    "Invalid row at {:?} line {}: {}",
                    path,
                    line_no + 1,
                    e
                ))
            })?;
            rows.push(row);
        }
        Self::new(rows)
    }

    /// Write rows as JSONL.
    pub fn write(&self, path: &Path) -> AppResult<()> {
        let mut file = fs::File::create(path)?;
        for row in &self.rows {
            let line = serde_json::to_string(row)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn get(&self, row_id: usize) -> Option<&EvidenceChunk> {
        self.rows.get(row_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only evidence store shared by all requests.
pub struct EvidenceStore {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Box<dyn VectorIndex>,
    rows: RowTable,
}

impl std::fmt::Debug for EvidenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceStore")
            .field("embedder", &self.embedder)
            .field("rows", &self.rows.len())
            .field("dimensions", &self.index.dimensions())
            .finish()
    }
}

impl EvidenceStore {
    /// Assemble a store, checking that the parts agree with each other.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Box<dyn VectorIndex>,
        rows: RowTable,
    ) -> AppResult<Self> {
        if index.len() != rows.len() {
            return Err(AppError::Config(format!(
                "Vector index has {} vectors but row table has {} rows",
                index.len(),
                rows.len()
            )));
        }

        if index.dimensions() != embedder.dimensions() {
            return Err(AppError::Config(format!(
                "Vector index has {} dimensions but embedder '{}' produces {}",
                index.dimensions(),
                embedder.provider_name(),
                embedder.dimensions()
            )));
        }

        Ok(Self {
            embedder,
            index,
            rows,
        })
    }

    /// Open a store directory written by the index builder.
    ///
    /// Any missing or inconsistent file is a configuration error: the
    /// service must not start over an uninitialized store.
    pub fn open(dir: &Path, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        for file in [ROWS_FILE, VECTORS_FILE, MANIFEST_FILE] {
            if !dir.join(file).exists() {
                return Err(AppError::Config(format!(
                    "Evidence store not initialized at {:?}: missing {}. Run 'grounded index build' first.",
                    dir, file
                )));
            }
        }

        let manifest = read_manifest(dir)?;
        if manifest.dimensions != embedder.dimensions() {
            return Err(AppError::Config(format!(
                "Store was built with {} dimensions, configured embedder produces {}",
                manifest.dimensions,
                embedder.dimensions()
            )));
        }
        if manifest.provider != embedder.provider_name() || manifest.model != embedder.model_name()
        {
            tracing::warn!(
                "Store was built with {}/{}, querying with {}/{}",
                manifest.provider,
                manifest.model,
                embedder.provider_name(),
                embedder.model_name()
            );
        }

        let rows = RowTable::load(&dir.join(ROWS_FILE))?;
        if manifest.row_count != rows.len() {
            return Err(AppError::Config(format!(
                "Manifest lists {} rows but {} has {}",
                manifest.row_count,
                ROWS_FILE,
                rows.len()
            )));
        }

        let conn = index::init_index(&dir.join(VECTORS_FILE))?;
        let stored = index::count_vectors(&conn)?;
        if stored != manifest.row_count {
            return Err(AppError::Config(format!(
                "Manifest lists {} rows but {} has {} vectors",
                manifest.row_count, VECTORS_FILE, stored
            )));
        }
        let vectors = index::load_vectors(&conn)?;
        let flat = FlatIndex::new(manifest.dimensions, vectors)?;

        tracing::info!(
            "Opened evidence store at {:?}: {} rows, {} dimensions",
            dir,
            rows.len(),
            manifest.dimensions
        );

        Self::new(embedder, Box::new(flat), rows)
    }

    /// Number of evidence rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Embed query text.
    pub async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let vector = self.embedder.embed(text).await?;
        if vector.len() != self.index.dimensions() {
            return Err(AppError::Backend(format!(
                "Embedder returned {} dimensions, expected {}",
                vector.len(),
                self.index.dimensions()
            )));
        }
        Ok(vector)
    }

    /// Nearest-neighbor search returning `(score, row_id)` pairs.
    pub fn search(&self, vector: &[f32], k: usize) -> AppResult<Vec<(f32, usize)>> {
        self.index.search(vector, k)
    }

    /// Look up a row id returned by [`EvidenceStore::search`].
    pub fn row(&self, row_id: usize) -> AppResult<&EvidenceChunk> {
        self.rows.get(row_id).ok_or_else(|| {
            AppError::Knowledge(format!(
                "Row id {} out of range ({} rows)",
                row_id,
                self.rows.len()
            ))
        })
    }
}

/// Read `manifest.json` from a store directory.
pub fn read_manifest(dir: &Path) -> AppResult<StoreManifest> {
    let path = dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("Invalid manifest at {:?}: {}", path, e)))
}

/// Write `manifest.json` into a store directory.
pub fn write_manifest(dir: &Path, manifest: &StoreManifest) -> AppResult<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(dir.join(MANIFEST_FILE), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use chrono::Utc;
    use tempfile::TempDir;

    fn chunk(doc: &str, chunk: &str) -> EvidenceChunk {
        EvidenceChunk {
            doc_id: doc.to_string(),
            source_name: format!("{}.txt", doc),
            page: None,
            chunk_id: chunk.to_string(),
            text: format!("text of {} {}", doc, chunk),
        }
    }

    fn write_store(dir: &Path, rows: &[EvidenceChunk], vectors: &[Vec<f32>], dims: usize) {
        RowTable::new(rows.to_vec())
            .unwrap()
            .write(&dir.join(ROWS_FILE))
            .unwrap();
        let mut conn = index::init_index(&dir.join(VECTORS_FILE)).unwrap();
        index::insert_vectors(&mut conn, vectors).unwrap();
        write_manifest(
            dir,
            &StoreManifest {
                provider: "trigram".to_string(),
                model: "trigram-v1".to_string(),
                dimensions: dims,
                row_count: rows.len(),
                built_at: Utc::now(),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = RowTable::new(vec![chunk("d", "c0001"), chunk("d", "c0001")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_open_round_trip() {
        let temp = TempDir::new().unwrap();
        let rows = vec![chunk("a", "c0001"), chunk("b", "c0001")];
        write_store(temp.path(), &rows, &[vec![1.0, 0.0], vec![0.0, 1.0]], 2);

        let store = EvidenceStore::open(temp.path(), Arc::new(TrigramProvider::new(2))).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.row(1).unwrap().key(), "b:c0001");
        assert_eq!(store.search(&[0.0, 1.0], 1).unwrap()[0].1, 1);
        assert!(matches!(store.row(5), Err(AppError::Knowledge(_))));
    }

    #[test]
    fn test_open_missing_store_is_config_error() {
        let temp = TempDir::new().unwrap();
        let result = EvidenceStore::open(temp.path(), Arc::new(TrigramProvider::new(2)));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_open_dimension_mismatch() {
        let temp = TempDir::new().unwrap();
        write_store(temp.path(), &[chunk("a", "c0001")], &[vec![1.0, 0.0]], 2);

        let result = EvidenceStore::open(temp.path(), Arc::new(TrigramProvider::new(384)));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_row_vector_count_mismatch() {
        let temp = TempDir::new().unwrap();
        write_store(
            temp.path(),
            &[chunk("a", "c0001")],
            &[vec![1.0, 0.0], vec![0.0, 1.0]],
            2,
        );

        let result = EvidenceStore::open(temp.path(), Arc::new(TrigramProvider::new(2)));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_blank_lines_do_not_count_as_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(ROWS_FILE);
        let line = serde_json::to_string(&chunk("a", "c0001")).unwrap();
        fs::write(&path, format!("\n{}\n\n", line)).unwrap();

        let table = RowTable::load(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().doc_id, "a");
    }
}
