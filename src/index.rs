//! Indexing pipeline orchestration.
//!
//! Coordinates a full index pass: note store → decode → chunk → embed →
//! search index. Every pass rebuilds the index from scratch. Decoding and
//! chunking are pure and run in parallel across notes; a note that fails
//! to decode is indexed under its title instead of aborting the pass.

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::chunk::chunk_note;
use crate::config::{ChunkingConfig, Config};
use crate::db;
use crate::embedding::{self, EmbeddingProvider};
use crate::extract::{HeuristicRecovery, TextRecovery};
use crate::migrate;
use crate::models::{IndexRecord, NoteRecord};
use crate::notestore::{decode_note, NoteStore};
use crate::store::{SearchIndex, SqliteIndex};

/// Counts reported at the end of an index pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub notes: usize,
    pub chunks: usize,
    pub embedded: usize,
    pub embedding_failures: usize,
}

/// Turn note store rows into index records.
///
/// A note whose body decodes to nothing is indexed as a single chunk
/// holding its title, so it stays findable by name.
pub fn prepare_records(
    notes: &[NoteRecord],
    chunking: &ChunkingConfig,
    recovery: &dyn TextRecovery,
) -> Vec<IndexRecord> {
    notes
        .par_iter()
        .flat_map_iter(|record| {
            let note = decode_note(record, recovery);
            let text = if note.body.is_empty() {
                debug!(title = %note.title, "empty body, indexing title only");
                note.title.as_str()
            } else {
                note.body.as_str()
            };

            chunk_note(&note.title, text, chunking)
                .into_iter()
                .map(|chunk| {
                    IndexRecord::new(
                        &chunk.source_title,
                        &chunk.text,
                        record.creation_date,
                        record.modification_date,
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Replace the index contents with `records`, embedding in batches.
///
/// A failed embedding batch is logged and stored without vectors; it
/// still participates in keyword search.
pub async fn write_records(
    index: &dyn SearchIndex,
    provider: Option<&dyn EmbeddingProvider>,
    records: &[IndexRecord],
    batch_size: usize,
) -> Result<(usize, usize)> {
    index.clear().await?;

    let mut embedded = 0usize;
    let mut failures = 0usize;

    for batch in records.chunks(batch_size.max(1)) {
        let vectors = match provider {
            Some(p) => {
                let texts: Vec<String> = batch.iter().map(|r| r.content.clone()).collect();
                match p.embed(&texts).await {
                    Ok(v) if v.len() == batch.len() => Some(v),
                    Ok(v) => {
                        warn!(
                            expected = batch.len(),
                            got = v.len(),
                            "embedding batch returned wrong number of vectors"
                        );
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, batch = batch.len(), "embedding batch failed");
                        None
                    }
                }
            }
            None => None,
        };

        match &vectors {
            Some(_) => embedded += batch.len(),
            None if provider.is_some() => failures += batch.len(),
            None => {}
        }

        index.insert_batch(batch, vectors.as_deref()).await?;
    }

    Ok((embedded, failures))
}

/// Index notes that were already read from a store.
pub async fn index_notes(
    config: &Config,
    index: &dyn SearchIndex,
    provider: Option<&dyn EmbeddingProvider>,
    notes: &[NoteRecord],
) -> Result<IndexSummary> {
    let recovery = HeuristicRecovery::new(config.extraction.clone());
    let records = prepare_records(notes, &config.chunking, &recovery);
    let (embedded, embedding_failures) =
        write_records(index, provider, &records, config.embedding.batch_size).await?;

    Ok(IndexSummary {
        notes: notes.len(),
        chunks: records.len(),
        embedded,
        embedding_failures,
    })
}

/// `notes index`: rebuild the index from the configured note store.
pub async fn run_index(config: &Config, limit: Option<usize>, dry_run: bool) -> Result<()> {
    let store = NoteStore::open(&config.notes.store_path).await?;
    let notes = store.list_notes(limit).await?;
    store.close().await;
    info!(count = notes.len(), "read notes from store");

    if dry_run {
        let recovery = HeuristicRecovery::new(config.extraction.clone());
        let records = prepare_records(&notes, &config.chunking, &recovery);
        println!("index (dry-run)");
        println!("  notes found: {}", notes.len());
        println!("  estimated chunks: {}", records.len());
        return Ok(());
    }

    let provider = if config.embedding.is_enabled() {
        Some(embedding::create_provider(&config.embedding)?)
    } else {
        None
    };

    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let index = SqliteIndex::new(pool);

    let summary = index_notes(config, &index, provider.as_deref(), &notes).await?;

    println!("index");
    println!("  notes: {}", summary.notes);
    println!("  chunks written: {}", summary.chunks);
    if config.embedding.is_enabled() {
        println!("  embeddings written: {}", summary.embedded);
        println!("  embedding failures: {}", summary.embedding_failures);
    }
    println!("ok");

    index.close().await;
    Ok(())
}
