//! Core data models used throughout Notes Harness.
//!
//! These types represent the notes, chunks, and ranked results that flow
//! through the indexing and retrieval pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Raw row read from the note store before decoding.
#[derive(Debug, Clone)]
pub struct NoteRecord {
    pub id: i64,
    pub title: String,
    pub content: Option<Vec<u8>>,
    /// Core Data seconds; `None`/`0` means unknown.
    pub creation_date: Option<i64>,
    pub modification_date: Option<i64>,
}

/// A decoded note.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// A bounded slice of a note's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub source_title: String,
    pub index: usize,
    pub text: String,
}

/// The unit written to and returned from the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub title: String,
    pub content: String,
    /// RFC 3339.
    pub creation_date: String,
    /// RFC 3339.
    pub modification_date: String,
}

impl IndexRecord {
    /// Build a record from raw Core Data timestamps.
    pub fn new(
        title: &str,
        content: &str,
        creation_date: Option<i64>,
        modification_date: Option<i64>,
    ) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            creation_date: timestamp::to_rfc3339(creation_date),
            modification_date: timestamp::to_rfc3339(modification_date),
        }
    }
}

/// A position within one ranking source (0 = best).
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem {
    pub title: String,
    pub content: String,
    pub rank: usize,
}

/// A result after combining ranking sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedResult {
    pub title: String,
    pub content: String,
    pub score: f64,
}
