//! Offline index builder.
//!
//! Turns a directory of `.txt`, `.md` and `.pdf` files into an evidence
//! store directory readable by [`EvidenceStore::open`](crate::store::EvidenceStore::open).
//!
//! The new store is written into a staging directory inside `store_dir`
//! and moved over the old files only after every step has succeeded, so a
//! failed rebuild leaves the previous store usable.

use crate::chunker::{chunk_text, normalize_text};
use crate::embeddings::EmbeddingProvider;
use crate::extract::{extract_sections, SUPPORTED_EXTENSIONS};
use crate::index;
use crate::store::{self, RowTable, MANIFEST_FILE, ROWS_FILE, VECTORS_FILE};
use crate::types::{BuildOptions, BuildStats, EvidenceChunk, StoreManifest};
use chrono::Utc;
use grounded_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Chunks embedded per provider call.
const EMBED_BATCH_SIZE: usize = 64;

/// Build an evidence store from every supported file under `input_dir`.
pub async fn build_index(
    input_dir: &Path,
    store_dir: &Path,
    embedder: &dyn EmbeddingProvider,
    options: &BuildOptions,
) -> AppResult<BuildStats> {
    let start = Instant::now();

    if !input_dir.is_dir() {
        return Err(AppError::Config(format!(
            "Input directory does not exist: {:?}",
            input_dir
        )));
    }
    if options.chunk_chars == 0 {
        return Err(AppError::Validation(
            "chunk_chars must be greater than zero".to_string(),
        ));
    }

    let replacing = check_store_dir(store_dir, options.reset)?;
    std::fs::create_dir_all(store_dir)?;
    let staging = tempfile::Builder::new()
        .prefix(".build-")
        .tempdir_in(store_dir)?;

    tracing::info!("Building evidence store from {:?}", input_dir);

    let mut rows = Vec::new();
    let mut documents_count = 0u32;
    let mut bytes_processed = 0u64;

    for path in collect_files(input_dir) {
        let raw = std::fs::read(&path)?;
        bytes_processed += raw.len() as u64;

        let sections = match extract_sections(&path, &raw) {
            Ok(sections) => sections,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let doc_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let source_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        // Chunk ids run on across pages
        let before = rows.len();
        for section in sections {
            let text = normalize_text(&section.text);
            for text in chunk_text(&text, options.chunk_chars, options.overlap_chars) {
                rows.push(EvidenceChunk {
                    doc_id: doc_id.clone(),
                    source_name: source_name.clone(),
                    page: section.page,
                    chunk_id: format!("c{:04}", rows.len() - before + 1),
                    text,
                });
            }
        }

        if rows.len() == before {
            tracing::debug!("Skipping empty document {:?}", path);
            continue;
        }
        tracing::debug!("{:?}: {} chunks", path, rows.len() - before);
        documents_count += 1;
    }

    // Two files with the same stem in different folders collide here
    let table = RowTable::new(rows)?;

    let mut vectors = Vec::with_capacity(table.len());
    let texts: Vec<String> = (0..table.len())
        .filter_map(|row_id| table.get(row_id).map(|c| c.text.clone()))
        .collect();
    for batch in texts.chunks(EMBED_BATCH_SIZE) {
        vectors.extend(embedder.embed_batch(batch).await?);
    }
    if vectors.len() != table.len() {
        return Err(AppError::Backend(format!(
            "Embedder returned {} vectors for {} chunks",
            vectors.len(),
            table.len()
        )));
    }

    let staged = staging.path();
    table.write(&staged.join(ROWS_FILE))?;
    {
        let mut conn = index::init_index(&staged.join(VECTORS_FILE))?;
        index::insert_vectors(&mut conn, &vectors)?;
    }
    store::write_manifest(
        staged,
        &StoreManifest {
            provider: embedder.provider_name().to_string(),
            model: embedder.model_name().to_string(),
            dimensions: embedder.dimensions(),
            row_count: table.len(),
            built_at: Utc::now(),
        },
    )?;

    if replacing {
        tracing::info!("Replacing evidence store at {:?}", store_dir);
    }
    // Manifest last: a store is complete once its manifest is in place
    for file in [ROWS_FILE, VECTORS_FILE, MANIFEST_FILE] {
        std::fs::rename(staged.join(file), store_dir.join(file))?;
    }

    let duration = start.elapsed();

    tracing::info!(
        "Index build completed: {} documents, {} chunks, {} bytes in {:.2}s",
        documents_count,
        table.len(),
        bytes_processed,
        duration.as_secs_f64()
    );

    Ok(BuildStats {
        documents_count,
        chunks_count: table.len() as u32,
        bytes_processed,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Refuse to overwrite an existing store unless `reset` is set.
///
/// Returns whether an existing store will be replaced.
fn check_store_dir(store_dir: &Path, reset: bool) -> AppResult<bool> {
    let exists = [ROWS_FILE, VECTORS_FILE, MANIFEST_FILE]
        .iter()
        .any(|f| store_dir.join(f).exists());

    if exists && !reset {
        return Err(AppError::Config(format!(
            "Evidence store already exists at {:?}. Use --reset to rebuild it.",
            store_dir
        )));
    }
    Ok(exists)
}

/// Supported files under `dir`, sorted by path.
fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
