//! SQLite persistence for evidence vectors.

use grounded_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// Initialize the SQLite vector database.
pub fn init_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS vectors (
            row_id INTEGER PRIMARY KEY,
            embedding BLOB NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Write all vectors in one transaction, position `i` as row id `i`.
pub fn insert_vectors(conn: &mut Connection, vectors: &[Vec<f32>]) -> AppResult<()> {
    let tx = conn
        .transaction()
        .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

    {
        let mut stmt = tx
            .prepare("INSERT OR REPLACE INTO vectors (row_id, embedding) VALUES (?1, ?2)")
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare insert: {}", e)))?;

        for (row_id, vector) in vectors.iter().enumerate() {
            stmt.execute(params![row_id as i64, embedding_to_bytes(vector)])
                .map_err(|e| AppError::Knowledge(format!("Failed to insert vector: {}", e)))?;
        }
    }

    tx.commit()
        .map_err(|e| AppError::Knowledge(format!("Failed to commit vectors: {}", e)))?;

    tracing::debug!("Wrote {} vectors", vectors.len());
    Ok(())
}

/// Load every vector ordered by row id.
///
/// Row ids must be contiguous from zero, otherwise the index is
/// inconsistent with its row table.
pub fn load_vectors(conn: &Connection) -> AppResult<Vec<Vec<f32>>> {
    let mut stmt = conn
        .prepare("SELECT row_id, embedding FROM vectors ORDER BY row_id")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))
        .map_err(|e| AppError::Knowledge(format!("Failed to query vectors: {}", e)))?;

    let mut vectors = Vec::new();
    for (expected, row) in rows.enumerate() {
        let (row_id, bytes) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read vector: {}", e)))?;
        if row_id != expected as i64 {
            return Err(AppError::Config(format!(
                "Vector index has a gap: expected row {}, found {}",
                expected, row_id
            )));
        }
        vectors.push(bytes_to_embedding(&bytes)?);
    }

    Ok(vectors)
}

/// Count stored vectors.
pub fn count_vectors(conn: &Connection) -> AppResult<usize> {
    conn.query_row("SELECT COUNT(*) FROM vectors", [], |row| {
        row.get::<_, i64>(0).map(|v| v as usize)
    })
    .map_err(|e| AppError::Knowledge(format!("Failed to count vectors: {}", e)))
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
