//! Read-only access to the macOS Notes database.
//!
//! Notes live in `ZICCLOUDSYNCINGOBJECT` (titles, dates, deletion flag)
//! with their gzip-framed bodies in `ZICNOTEDATA.ZDATA`. Dates are Core
//! Data seconds; see [`crate::timestamp`].

use anyhow::Result;
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::db;
use crate::decode::decode_content;
use crate::extract::TextRecovery;
use crate::models::{Note, NoteRecord};
use crate::timestamp;

const SELECT_NOTES: &str = r#"
    SELECT n.Z_PK AS id,
           n.ZTITLE1 AS title,
           d.ZDATA AS content,
           CAST(COALESCE(n.ZCREATIONDATE3, n.ZCREATIONDATE1) AS INTEGER) AS creation_date,
           CAST(n.ZMODIFICATIONDATE1 AS INTEGER) AS modification_date
    FROM ZICCLOUDSYNCINGOBJECT n
    LEFT JOIN ZICNOTEDATA d ON d.ZNOTE = n.Z_PK
    WHERE n.ZTITLE1 IS NOT NULL
      AND COALESCE(n.ZMARKEDFORDELETION, 0) = 0
"#;

/// Handle on a Notes `NoteStore.sqlite` file.
pub struct NoteStore {
    pool: SqlitePool,
}

impl NoteStore {
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect_read_only(path).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All live notes, most recently modified first.
    pub async fn list_notes(&self, limit: Option<usize>) -> Result<Vec<NoteRecord>> {
        let sql = format!(
            "{} ORDER BY modification_date DESC, id ASC LIMIT ?",
            SELECT_NOTES
        );
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| match row_to_record(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    let id = row.try_get::<i64, _>("id").ok();
                    tracing::warn!(?id, error = %e, "skipping unreadable note row");
                    None
                }
            })
            .collect())
    }

    /// The most recently modified live note with exactly this title.
    pub async fn find_by_title(&self, title: &str) -> Result<Option<NoteRecord>> {
        let sql = format!(
            "{} AND n.ZTITLE1 = ? ORDER BY modification_date DESC LIMIT 1",
            SELECT_NOTES
        );
        let row = sqlx::query(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_record).transpose()?)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<NoteRecord, sqlx::Error> {
    Ok(NoteRecord {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        creation_date: row.try_get("creation_date")?,
        modification_date: row.try_get("modification_date")?,
    })
}

/// Decode a raw record into a [`Note`]. Never fails; see [`decode_content`].
pub fn decode_note(record: &NoteRecord, recovery: &dyn TextRecovery) -> Note {
    let body = tracing::warn_span!("note", id = record.id, title = %record.title)
        .in_scope(|| decode_content(record.content.as_deref(), recovery));

    Note {
        id: record.id,
        title: record.title.clone(),
        body,
        created_at: timestamp::from_core_data(record.creation_date),
        modified_at: timestamp::from_core_data(record.modification_date),
    }
}
