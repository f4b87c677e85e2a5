//! TOML configuration.
//!
//! Every section is optional; missing sections and keys take the defaults
//! below. [`load_config`] rejects settings the pipeline cannot run with
//! (most importantly an overlap that is not smaller than the chunk size)
//! before any chunking happens.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extract::ExtractionThresholds;

/// Location of the Notes database inside the user's home directory.
const NOTE_STORE_RELATIVE: &str = "Library/Group Containers/group.com.apple.notes/NoteStore.sqlite";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub notes: NotesConfig,
    pub db: DbConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub extraction: ExtractionThresholds,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotesConfig {
    pub store_path: PathBuf,
}

impl Default for NotesConfig {
    fn default() -> Self {
        let store_path = dirs::home_dir()
            .map(|home| home.join(NOTE_STORE_RELATIVE))
            .unwrap_or_else(|| PathBuf::from(NOTE_STORE_RELATIVE));
        Self { store_path }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/notes-index.sqlite"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub max_chunk_size: usize,
    /// Characters shared by consecutive chunks; must be < `max_chunk_size`.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates fetched from each source before fusion.
    pub candidate_k: usize,
    pub final_limit: usize,
    pub rrf_k: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_k: 20,
            final_limit: 10,
            rrf_k: crate::fusion::DEFAULT_RRF_K,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: Option<String>,
    pub dims: Option<usize>,
    pub batch_size: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
    /// Base URL for the Ollama provider.
    pub url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model: None,
            dims: None,
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
            url: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

/// Settings the pipeline refuses to run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("chunking.max_chunk_size must be > 0")]
    ZeroChunkSize,
    #[error("chunking.overlap ({overlap}) must be smaller than chunking.max_chunk_size ({max})")]
    OverlapTooLarge { overlap: usize, max: usize },
    #[error("retrieval.final_limit must be >= 1")]
    ZeroFinalLimit,
    #[error("retrieval.candidate_k must be >= 1")]
    ZeroCandidateK,
    #[error("retrieval.rrf_k must be a positive number, got {0}")]
    InvalidRrfK(f64),
    #[error("embedding.batch_size must be >= 1")]
    ZeroBatchSize,
    #[error("unknown embedding provider: '{0}'. Must be disabled, local, or ollama.")]
    UnknownProvider(String),
    #[error("embedding.model must be specified when provider is 'ollama'")]
    MissingOllamaModel,
    #[error("invalid extraction settings: {0}")]
    Extraction(#[from] crate::extract::ExtractionError),
}

impl Config {
    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunking.max_chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunking.overlap >= self.chunking.max_chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.chunking.overlap,
                max: self.chunking.max_chunk_size,
            });
        }

        if self.retrieval.final_limit == 0 {
            return Err(ConfigError::ZeroFinalLimit);
        }
        if self.retrieval.candidate_k == 0 {
            return Err(ConfigError::ZeroCandidateK);
        }
        if !(self.retrieval.rrf_k.is_finite() && self.retrieval.rrf_k > 0.0) {
            return Err(ConfigError::InvalidRrfK(self.retrieval.rrf_k));
        }

        if self.embedding.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        match self.embedding.provider.as_str() {
            "disabled" | "local" => {}
            "ollama" => {
                if self.embedding.model.is_none() {
                    return Err(ConfigError::MissingOllamaModel);
                }
            }
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        }

        self.extraction.validate()?;
        Ok(())
    }
}

/// Parse and validate a configuration string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}
