//! Hybrid note search.
//!
//! The vector and keyword queries run concurrently against the
//! [`SearchIndex`], and their best-first lists are merged with
//! Reciprocal Rank Fusion. `keyword` and `semantic` modes query a single
//! source; the result still goes through fusion so scores have one shape.

use anyhow::{bail, Result};
use std::str::FromStr;

use crate::config::{Config, RetrievalConfig};
use crate::db;
use crate::embedding::{self, EmbeddingProvider};
use crate::fusion::{rank_records, reciprocal_rank_fusion};
use crate::migrate;
use crate::models::{FusedResult, IndexRecord};
use crate::store::{SearchIndex, SqliteIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Keyword,
    Semantic,
    Hybrid,
}

impl SearchMode {
    fn uses_vectors(self) -> bool {
        matches!(self, SearchMode::Semantic | SearchMode::Hybrid)
    }

    fn uses_keywords(self) -> bool {
        matches!(self, SearchMode::Keyword | SearchMode::Hybrid)
    }
}

impl FromStr for SearchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "keyword" => Ok(SearchMode::Keyword),
            "semantic" => Ok(SearchMode::Semantic),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => bail!(
                "Unknown search mode: {}. Use keyword, semantic, or hybrid.",
                other
            ),
        }
    }
}

/// Query both sources and fuse them.
pub async fn search(
    index: &dyn SearchIndex,
    provider: Option<&dyn EmbeddingProvider>,
    query: &str,
    mode: SearchMode,
    retrieval: &RetrievalConfig,
    limit: usize,
) -> Result<Vec<FusedResult>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let vector_fut = async {
        if !mode.uses_vectors() {
            return Ok(Vec::<IndexRecord>::new());
        }
        let Some(provider) = provider else {
            bail!("Mode requires embeddings. Set [embedding] provider in config.");
        };
        let query_vec = embedding::embed_query(provider, query).await?;
        index.vector_search(&query_vec, retrieval.candidate_k).await
    };

    let keyword_fut = async {
        if !mode.uses_keywords() {
            return Ok(Vec::<IndexRecord>::new());
        }
        index.keyword_search(query, retrieval.candidate_k).await
    };

    let (vector_hits, keyword_hits) = tokio::try_join!(vector_fut, keyword_fut)?;
    tracing::debug!(
        vector = vector_hits.len(),
        keyword = keyword_hits.len(),
        "retrieved candidates"
    );

    Ok(reciprocal_rank_fusion(
        &rank_records(&vector_hits),
        &rank_records(&keyword_hits),
        retrieval.rrf_k,
        limit,
    ))
}

/// `notes search`: run a query against the index and print the results.
pub async fn run_search(
    config: &Config,
    query: &str,
    mode: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let mode: SearchMode = mode.parse()?;

    if mode.uses_vectors() && !config.embedding.is_enabled() {
        bail!(
            "Mode '{:?}' requires embeddings. Set [embedding] provider in config.",
            mode
        );
    }

    let provider = if mode.uses_vectors() {
        Some(embedding::create_provider(&config.embedding)?)
    } else {
        None
    };

    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let index = SqliteIndex::new(pool);

    let limit = limit.unwrap_or(config.retrieval.final_limit);
    let results = search(
        &index,
        provider.as_deref(),
        query,
        mode,
        &config.retrieval,
        limit,
    )
    .await?;
    index.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!("{}. [{:.4}] {}", i + 1, result.score, result.title);
        println!("    excerpt: \"{}\"", excerpt(&result.content, 240));
        println!();
    }

    Ok(())
}

/// First `max_chars` characters on one line.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        flat.to_string()
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
