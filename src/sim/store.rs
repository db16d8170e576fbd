//! Persistence for game results.
//!
//! The core only depends on the [`ResultStore`] contract. Two stores ship
//! with the crate: an in-memory one for tests and pipelines, and a JSON
//! lines file with one [`GameResult`] per line.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::Archetype;
use crate::sim::runner::GameResult;

/// Which results to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFilter {
    /// Only games with this many participants.
    pub player_count: Option<usize>,
    /// Only games where some seat used this policy.
    pub policy: Option<String>,
    /// Only games won by this archetype.
    pub winner: Option<Archetype>,
}

impl ResultFilter {
    /// Filter that accepts everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builder method: restrict to a participant count.
    pub fn with_player_count(mut self, count: usize) -> Self {
        self.player_count = Some(count);
        self
    }

    /// Builder method: restrict to games featuring a policy.
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Builder method: restrict to games won by an archetype.
    pub fn with_winner(mut self, winner: Archetype) -> Self {
        self.winner = Some(winner);
        self
    }

    /// Whether `result` passes the filter.
    pub fn matches(&self, result: &GameResult) -> bool {
        self.player_count.map_or(true, |n| result.player_count() == n)
            && self.policy.as_deref().map_or(true, |p| result.has_policy(p))
            && self.winner.map_or(true, |w| result.winner_character() == Some(w))
    }
}

/// Errors raised by a result store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error on line {line}: {source}")]
    Serde {
        /// 1-based line number, 0 when writing.
        line: usize,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The lock guarding an in-memory store was poisoned.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Save/load contract for finished games.
pub trait ResultStore: Send + Sync {
    /// Append `results`.
    fn save(&self, results: &[GameResult]) -> Result<(), StoreError>;

    /// Every stored result matching `filter`, in save order.
    fn load(&self, filter: &ResultFilter) -> Result<Vec<GameResult>, StoreError>;
}

// ============================================================================
// In-memory
// ============================================================================

/// Results kept in a lock-guarded vector.
#[derive(Debug, Default)]
pub struct MemoryStore {
    results: RwLock<Vec<GameResult>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored results.
    pub fn len(&self) -> usize {
        self.results.read().map_or(0, |r| r.len())
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryStore {
    fn save(&self, results: &[GameResult]) -> Result<(), StoreError> {
        let mut stored = self.results.write().map_err(|_| StoreError::Poisoned)?;
        stored.extend_from_slice(results);
        Ok(())
    }

    fn load(&self, filter: &ResultFilter) -> Result<Vec<GameResult>, StoreError> {
        let stored = self.results.read().map_err(|_| StoreError::Poisoned)?;
        Ok(stored.iter().filter(|r| filter.matches(r)).cloned().collect())
    }
}

// ============================================================================
// JSON lines
// ============================================================================

/// Results appended to a file, one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    /// Store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for JsonLinesStore {
    fn save(&self, results: &[GameResult]) -> Result<(), StoreError> {
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for result in results {
            serde_json::to_writer(&mut writer, result).map_err(|source| StoreError::Serde { line: 0, source })?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn load(&self, filter: &ResultFilter) -> Result<Vec<GameResult>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut out = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let result: GameResult =
                serde_json::from_str(&line).map_err(|source| StoreError::Serde { line: index + 1, source })?;
            if filter.matches(&result) {
                out.push(result);
            }
        }
        Ok(out)
    }
}
