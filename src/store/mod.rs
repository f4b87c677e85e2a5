//! Search index abstraction.
//!
//! The [`SearchIndex`] trait is the boundary between the pipeline and
//! wherever chunks are persisted. Indexing writes [`IndexRecord`] batches;
//! querying reads two independently ranked lists (vector similarity and
//! lexical) that the caller fuses.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::IndexRecord;

pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

/// Abstract chunk index.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`clear`](SearchIndex::clear) | Drop every indexed chunk before a full pass |
/// | [`insert_batch`](SearchIndex::insert_batch) | Append records, optionally with vectors |
/// | [`vector_search`](SearchIndex::vector_search) | Best-first by cosine similarity |
/// | [`keyword_search`](SearchIndex::keyword_search) | Best-first by lexical relevance |
/// | [`count`](SearchIndex::count) | Number of indexed chunks |
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn clear(&self) -> Result<()>;

    /// Append records. When `vectors` is given it must match `records` 1:1.
    async fn insert_batch(
        &self,
        records: &[IndexRecord],
        vectors: Option<&[Vec<f32>]>,
    ) -> Result<()>;

    async fn vector_search(&self, query_vec: &[f32], k: usize) -> Result<Vec<IndexRecord>>;

    async fn keyword_search(&self, query: &str, k: usize) -> Result<Vec<IndexRecord>>;

    async fn count(&self) -> Result<usize>;
}

/// Lowercased alphanumeric terms of a query.
pub(crate) fn query_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
