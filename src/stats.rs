//! Index statistics.
//!
//! A quick summary of what the last index pass produced: chunk and note
//! counts, embedding coverage, and the settings that shaped them.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::migrate;

/// Run the stats command: query the index and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;

    let total_chunks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
        .fetch_one(&pool)
        .await?;

    let total_notes: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT title) FROM chunks")
        .fetch_one(&pool)
        .await?;

    let total_embedded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunk_vectors")
        .fetch_one(&pool)
        .await?;

    let newest: Option<String> = sqlx::query_scalar("SELECT MAX(modification_date) FROM chunks")
        .fetch_one(&pool)
        .await?;

    pool.close().await;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Notes Harness: Index Stats");
    println!("==========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!("  Note store:  {}", config.notes.store_path.display());
    println!();
    println!("  Notes:       {}", total_notes);
    println!("  Chunks:      {}", total_chunks);
    println!(
        "  Embedded:    {} / {} ({}%)",
        total_embedded,
        total_chunks,
        coverage_percent(total_embedded, total_chunks)
    );
    if let Some(newest) = newest {
        println!("  Newest note: {}", newest);
    }
    println!();
    println!(
        "  Chunking:    max {} chars, overlap {}",
        config.chunking.max_chunk_size, config.chunking.overlap
    );
    println!(
        "  Retrieval:   k={} candidates={} limit={}",
        config.retrieval.rrf_k, config.retrieval.candidate_k, config.retrieval.final_limit
    );
    println!("  Embedding:   {}", config.embedding.provider);
    println!();

    Ok(())
}

fn coverage_percent(embedded: i64, total: i64) -> i64 {
    if total > 0 {
        (embedded * 100) / total
    } else {
        0
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_coverage_percent() {
        assert_eq!(coverage_percent(0, 0), 0);
        assert_eq!(coverage_percent(1, 4), 25);
    }
}
