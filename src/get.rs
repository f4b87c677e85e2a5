//! Note retrieval straight from the note store.
//!
//! `notes get` and `notes list` read `NoteStore.sqlite` directly rather
//! than the chunk index, so they reflect the current state of Notes even
//! before an index pass.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::Config;
use crate::extract::HeuristicRecovery;
use crate::models::Note;
use crate::notestore::{decode_note, NoteStore};

/// One row of `notes list`.
#[derive(Debug, Clone, Serialize)]
pub struct NoteSummary {
    pub id: i64,
    pub title: String,
    pub created_at: String, // ISO8601
    pub modified_at: String, // ISO8601
}

/// Decode the most recently modified note with this exact title.
pub async fn get_note(config: &Config, title: &str) -> Result<Note> {
    let store = NoteStore::open(&config.notes.store_path).await?;
    let record = store.find_by_title(title).await?;
    store.close().await;

    let Some(record) = record else {
        bail!("note not found: {}", title);
    };

    let recovery = HeuristicRecovery::new(config.extraction.clone());
    Ok(decode_note(&record, &recovery))
}

/// Titles and dates of live notes, newest first. Bodies are not decoded.
pub async fn list_notes(config: &Config, limit: Option<usize>) -> Result<Vec<NoteSummary>> {
    let store = NoteStore::open(&config.notes.store_path).await?;
    let records = store.list_notes(limit).await?;
    store.close().await;

    Ok(records
        .iter()
        .map(|r| NoteSummary {
            id: r.id,
            title: r.title.clone(),
            created_at: format_ts_iso(r.creation_date),
            modified_at: format_ts_iso(r.modification_date),
        })
        .collect())
}

pub async fn run_get(config: &Config, title: &str, json: bool) -> Result<()> {
    let note = get_note(config, title).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
        return Ok(());
    }

    println!("--- Note ---");
    println!("id:           {}", note.id);
    println!("title:        {}", note.title);
    println!("created_at:   {}", note.created_at.format("%Y-%m-%dT%H:%M:%SZ"));
    println!("modified_at:  {}", note.modified_at.format("%Y-%m-%dT%H:%M:%SZ"));
    println!();

    println!("--- Body ---");
    if note.body.is_empty() {
        println!("(no readable content)");
    } else {
        println!("{}", note.body);
    }

    Ok(())
}

pub async fn run_list(config: &Config, limit: Option<usize>, json: bool) -> Result<()> {
    let notes = list_notes(config, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("No notes.");
        return Ok(());
    }

    println!("{:<22} {}", "MODIFIED", "TITLE");
    println!("{}", "-".repeat(60));
    for note in &notes {
        println!("{:<22} {}", note.modified_at, note.title);
    }

    Ok(())
}

fn format_ts_iso(seconds: Option<i64>) -> String {
    crate::timestamp::from_core_data(seconds)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
