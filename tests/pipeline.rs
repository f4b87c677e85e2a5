//! Library-level tests for the index pipeline over a real SQLite index.
//!
//! A stub embedding provider stands in for a model so the vector half of
//! hybrid search can run without network access or model downloads.

use anyhow::Result;
use async_trait::async_trait;
use notes_harness::config::{Config, RetrievalConfig};
use notes_harness::db;
use notes_harness::embedding::EmbeddingProvider;
use notes_harness::index::index_notes;
use notes_harness::migrate;
use notes_harness::models::NoteRecord;
use notes_harness::search::{search, SearchMode};
use notes_harness::store::{SearchIndex, SqliteIndex};
use tempfile::TempDir;

// ─── Stub Provider ──────────────────────────────────────────────────

/// Three fixed topics; a text's vector marks which topic words it contains.
struct TopicEmbedder;

const TOPICS: [&str; 3] = ["travel", "baking", "garden"];

#[async_trait]
impl EmbeddingProvider for TopicEmbedder {
    fn model_name(&self) -> &str {
        "topic-stub"
    }

    fn dims(&self) -> usize {
        TOPICS.len()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                TOPICS
                    .iter()
                    .map(|topic| if t.contains(topic) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn note(id: i64, title: &str, body: &str) -> NoteRecord {
    NoteRecord {
        id,
        title: title.to_string(),
        content: Some(body.as_bytes().to_vec()),
        creation_date: Some(694_224_000),
        modification_date: Some(694_224_000 + id),
    }
}

async fn open_index(tmp: &TempDir) -> (Config, SqliteIndex) {
    let mut config = Config::default();
    config.db.path = tmp.path().join("index.sqlite");
    let pool = db::connect(&config).await.unwrap();
    migrate::apply_schema(&pool).await.unwrap();
    (config, SqliteIndex::new(pool))
}

fn sample_notes() -> Vec<NoteRecord> {
    vec![
        note(1, "Lisbon trip", "Travel plans: trams, pastries and the coast."),
        note(2, "Bread", "Baking notes: hydration at 75 percent, long proof."),
        note(3, "Allotment", "Garden beds need compost before spring."),
    ]
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_index_and_keyword_search() {
    let tmp = TempDir::new().unwrap();
    let (config, index) = open_index(&tmp).await;

    let summary = index_notes(&config, &index, None, &sample_notes())
        .await
        .unwrap();
    assert_eq!(summary.notes, 3);
    assert_eq!(summary.chunks, 3);
    assert_eq!(index.count().await.unwrap(), 3);

    let hits = index.keyword_search("compost", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Allotment");
    assert_eq!(hits[0].creation_date, "2023-01-01T00:00:00+00:00");

    index.close().await;
}

#[tokio::test]
async fn test_keyword_search_tolerates_fts_syntax() {
    let tmp = TempDir::new().unwrap();
    let (config, index) = open_index(&tmp).await;
    index_notes(&config, &index, None, &sample_notes())
        .await
        .unwrap();

    let hits = index.keyword_search("\"compost* NEAR (", 10).await.unwrap();
    assert_eq!(hits[0].title, "Allotment");

    let none = index.keyword_search("()*", 10).await.unwrap();
    assert!(none.is_empty());

    index.close().await;
}

#[tokio::test]
async fn test_hybrid_search_fuses_both_sources() {
    let tmp = TempDir::new().unwrap();
    let (config, index) = open_index(&tmp).await;

    let summary = index_notes(&config, &index, Some(&TopicEmbedder), &sample_notes())
        .await
        .unwrap();
    assert_eq!(summary.embedded, 3);

    let results = search(
        &index,
        Some(&TopicEmbedder),
        "baking proof",
        SearchMode::Hybrid,
        &RetrievalConfig::default(),
        10,
    )
    .await
    .unwrap();

    // First in both lists.
    assert_eq!(results[0].title, "Bread");
    assert!((results[0].score - 2.0 / 60.0).abs() < 1e-12);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));

    index.close().await;
}

#[tokio::test]
async fn test_semantic_search_uses_vectors_only() {
    let tmp = TempDir::new().unwrap();
    let (config, index) = open_index(&tmp).await;
    index_notes(&config, &index, Some(&TopicEmbedder), &sample_notes())
        .await
        .unwrap();

    let results = search(
        &index,
        Some(&TopicEmbedder),
        "garden",
        SearchMode::Semantic,
        &RetrievalConfig::default(),
        1,
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Allotment");
    assert!((results[0].score - 1.0 / 60.0).abs() < 1e-12);

    index.close().await;
}

#[tokio::test]
async fn test_reindex_replaces_rows() {
    let tmp = TempDir::new().unwrap();
    let (config, index) = open_index(&tmp).await;

    index_notes(&config, &index, Some(&TopicEmbedder), &sample_notes())
        .await
        .unwrap();
    index_notes(&config, &index, None, &sample_notes()[..1])
        .await
        .unwrap();

    assert_eq!(index.count().await.unwrap(), 1);
    assert!(index.vector_search(&[1.0, 0.0, 0.0], 10).await.unwrap().is_empty());
    assert!(index.keyword_search("compost", 10).await.unwrap().is_empty());

    index.close().await;
}
