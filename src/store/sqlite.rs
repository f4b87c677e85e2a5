//! SQLite-backed [`SearchIndex`] implementation.
//!
//! Chunks live in `chunks`, mirrored into the `chunks_fts` FTS5 table
//! (same rowid) for lexical search. Vectors are stored as little-endian
//! f32 BLOBs in `chunk_vectors`; similarity is computed in Rust.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use crate::models::IndexRecord;

use super::{query_terms, SearchIndex};

/// SQLite implementation of the [`SearchIndex`] trait.
pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> IndexRecord {
    IndexRecord {
        title: row.get("title"),
        content: row.get("content"),
        creation_date: row.get("creation_date"),
        modification_date: row.get("modification_date"),
    }
}

/// Build an FTS5 MATCH expression that cannot trip over query syntax.
///
/// Terms are alphanumeric only, quoted, and OR-ed together.
pub fn fts_match_expression(query: &str) -> Option<String> {
    let terms = query_terms(query);
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

#[async_trait]
impl SearchIndex for SqliteIndex {
    async fn clear(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM chunk_vectors")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM chunks_fts").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM chunks").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_batch(
        &self,
        records: &[IndexRecord],
        vectors: Option<&[Vec<f32>]>,
    ) -> Result<()> {
        if let Some(vecs) = vectors {
            if vecs.len() != records.len() {
                bail!(
                    "vector count ({}) does not match record count ({})",
                    vecs.len(),
                    records.len()
                );
            }
        }

        let mut tx = self.pool.begin().await?;

        for (i, record) in records.iter().enumerate() {
            let chunk_id = sqlx::query(
                "INSERT INTO chunks (title, content, creation_date, modification_date) VALUES (?, ?, ?, ?)",
            )
            .bind(&record.title)
            .bind(&record.content)
            .bind(&record.creation_date)
            .bind(&record.modification_date)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            sqlx::query("INSERT INTO chunks_fts (rowid, title, content) VALUES (?, ?, ?)")
                .bind(chunk_id)
                .bind(&record.title)
                .bind(&record.content)
                .execute(&mut *tx)
                .await?;

            if let Some(vecs) = vectors {
                let vector = &vecs[i];
                sqlx::query(
                    "INSERT INTO chunk_vectors (chunk_id, dims, embedding) VALUES (?, ?, ?)",
                )
                .bind(chunk_id)
                .bind(vector.len() as i64)
                .bind(vec_to_blob(vector))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn vector_search(&self, query_vec: &[f32], k: usize) -> Result<Vec<IndexRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT c.title, c.content, c.creation_date, c.modification_date, cv.embedding
            FROM chunk_vectors cv
            JOIN chunks c ON c.id = cv.chunk_id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut scored: Vec<(f32, IndexRecord)> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let similarity = cosine_similarity(query_vec, &blob_to_vec(&blob));
                (similarity, row_to_record(row))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored.into_iter().map(|(_, r)| r).collect())
    }

    async fn keyword_search(&self, query: &str, k: usize) -> Result<Vec<IndexRecord>> {
        let Some(expression) = fts_match_expression(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT c.title, c.content, c.creation_date, c.modification_date
            FROM chunks_fts
            JOIN chunks c ON c.id = chunks_fts.rowid
            WHERE chunks_fts MATCH ?
            ORDER BY bm25(chunks_fts), c.id
            LIMIT ?
            "#,
        )
        .bind(expression)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
