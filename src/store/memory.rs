//! In-memory [`SearchIndex`] implementation for tests and dry runs.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Vector search is brute-force
//! cosine similarity; keyword search ranks by the number of distinct query
//! terms a chunk contains.

use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::IndexRecord;

use super::{query_terms, SearchIndex};

struct StoredRecord {
    record: IndexRecord,
    vector: Option<Vec<f32>>,
}

/// In-memory chunk index.
#[derive(Default)]
pub struct MemoryIndex {
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<StoredRecord>>> {
        self.records
            .read()
            .map_err(|_| anyhow::anyhow!("memory index lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<StoredRecord>>> {
        self.records
            .write()
            .map_err(|_| anyhow::anyhow!("memory index lock poisoned"))
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn clear(&self) -> Result<()> {
        self.write()?.clear();
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

        let mut stored = self.write()?;
        for (i, record) in records.iter().enumerate() {
            stored.push(StoredRecord {
                record: record.clone(),
                vector: vectors.map(|v| v[i].clone()),
            });
        }
        Ok(())
    }

    async fn vector_search(&self, query_vec: &[f32], k: usize) -> Result<Vec<IndexRecord>> {
        let stored = self.read()?;
        let mut scored: Vec<(f32, &IndexRecord)> = stored
            .iter()
            .filter_map(|s| {
                s.vector
                    .as_ref()
                    .map(|v| (cosine_similarity(query_vec, v), &s.record))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn keyword_search(&self, query: &str, k: usize) -> Result<Vec<IndexRecord>> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self.read()?;
        let mut scored: Vec<(usize, &IndexRecord)> = stored
            .iter()
            .filter_map(|s| {
                let haystack = format!("{} {}", s.record.title, s.record.content).to_lowercase();
                let hits = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                (hits > 0).then_some((hits, &s.record))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
