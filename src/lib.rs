//! # Notes Harness
//!
//! Local-first indexing and retrieval over macOS Notes.
//!
//! Notes Harness reads note bodies out of the Notes `NoteStore.sqlite`
//! database, recovers readable text from their gzip-framed binary
//! payloads, splits that text into overlapping sentence-aware chunks, and
//! serves hybrid search (keyword + semantic) fused with Reciprocal Rank
//! Fusion.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌───────────┐
//! │ NoteStore   │──▶│ Decode + Extract │──▶│  Chunk    │
//! │ (read-only) │   │  gzip → text     │   │ + Embed   │
//! └─────────────┘   └──────────────────┘   └────┬──────┘
//!                                               ▼
//!                   ┌──────────┐          ┌───────────┐
//!                   │   RRF    │◀─────────│  SQLite   │
//!                   │  fusion  │  vector  │ FTS5+Vec  │
//!                   └────┬─────┘  + fts   └───────────┘
//!                        ▼
//!                   ┌──────────┐
//!                   │   CLI    │
//!                   │ (notes)  │
//!                   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! notes init                        # create the index database
//! notes index                       # read, decode, chunk, embed
//! notes search "passport renewal"   # hybrid search
//! notes get "Groceries"             # print one decoded note
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`timestamp`] | Core Data epoch conversion |
//! | [`decode`] | gzip detection and decompression |
//! | [`extract`] | Readable-text recovery from decoded payloads |
//! | [`chunk`] | Sentence-aware overlapping chunking |
//! | [`fusion`] | Reciprocal Rank Fusion |
//! | [`notestore`] | Read-only access to the Notes database |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`store`] | Search index trait and backends |
//! | [`index`] | Index pass orchestration |
//! | [`search`] | Keyword, semantic, and hybrid search |
//! | [`get`] | Note lookup and listing |
//! | [`stats`] | Index statistics |
//! | [`db`] | Database connections |
//! | [`migrate`] | Schema setup |

pub mod chunk;
pub mod config;
pub mod db;
pub mod decode;
pub mod embedding;
pub mod extract;
pub mod fusion;
pub mod get;
pub mod index;
pub mod migrate;
pub mod models;
pub mod notestore;
pub mod search;
pub mod stats;
pub mod store;
pub mod timestamp;
