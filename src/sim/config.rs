//! Game and batch configuration.
//!
//! Both structs load from JSON with missing fields filled from their
//! defaults, and are validated before use:
//!
//! ```json
//! {
//!   "total_games": 400,
//!   "player_counts": [2, 3],
//!   "policies": ["greedy", "weighted", "mcts"],
//!   "difficulty": "hard",
//!   "seed": 42,
//!   "concurrency": 8
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::transition::{MAX_PLAYERS, MIN_PLAYERS};
use crate::engine::{RuleSet, RulesError};
use crate::policy::{self, Difficulty, PolicyError, PolicyKind};

/// Safety cap on resolved actions per game.
pub const DEFAULT_MAX_ACTIONS: usize = 1000;

// ============================================================================
// Single game
// ============================================================================

/// Everything needed to run one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of participants, 2 to 4.
    pub player_count: usize,

    /// Strength tier for seats without an explicit policy.
    pub difficulty: Difficulty,

    /// Per-seat policy names. Empty means every seat uses the tier default;
    /// otherwise one entry per seat, `None` again meaning the default.
    pub policies: Vec<Option<String>>,

    /// Seed for the deal and every policy decision. Random if `None`.
    pub seed: Option<u64>,

    /// Safety cap on resolved actions.
    pub max_actions: usize,

    /// Rule constants.
    pub rules: RuleSet,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            difficulty: Difficulty::default(),
            policies: Vec::new(),
            seed: None,
            max_actions: DEFAULT_MAX_ACTIONS,
            rules: RuleSet::default(),
        }
    }
}

impl GameConfig {
    /// Config for `player_count` seats with default everything else.
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            ..Default::default()
        }
    }

    /// Builder method: set per-seat policy names.
    pub fn with_policies<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.policies = names.into_iter().map(|n| Some(n.into())).collect();
        self
    }

    /// Builder method: set the difficulty tier.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set the action cap.
    pub fn with_max_actions(mut self, max_actions: usize) -> Self {
        self.max_actions = max_actions;
        self
    }

    /// Builder method: set the rule constants.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_player_count(self.player_count)?;
        if !self.policies.is_empty() && self.policies.len() != self.player_count {
            return Err(ConfigError::PolicyCountMismatch {
                expected: self.player_count,
                actual: self.policies.len(),
            });
        }
        if self.max_actions == 0 {
            return Err(ConfigError::ZeroMaxActions);
        }
        self.rules.validate()?;
        self.resolved_policies().map(|_| ())
    }

    /// Policy kind for every seat.
    pub fn resolved_policies(&self) -> Result<Vec<PolicyKind>, ConfigError> {
        (0..self.player_count)
            .map(|seat| {
                let name = self.policies.get(seat).and_then(|n| n.as_deref());
                Ok(policy::resolve(name, self.difficulty)?)
            })
            .collect()
    }
}

// ============================================================================
// Batch
// ============================================================================

/// A batch of independent games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Games to run across all configurations.
    pub total_games: usize,

    /// Participant counts to test.
    pub player_counts: Vec<usize>,

    /// Policy pool. Used when `matchups` is empty: every multiset of
    /// `player_count` policies becomes one configuration.
    pub policies: Vec<String>,

    /// Explicit seat lineups. Each must match one of `player_counts`.
    pub matchups: Vec<Vec<String>>,

    /// Tier used to size tree-search seats.
    pub difficulty: Difficulty,

    /// Base seed. Game `i` of the batch uses `seed + i`.
    pub seed: u64,

    /// Worker threads. `None` uses every core.
    pub concurrency: Option<usize>,

    /// Safety cap on resolved actions per game.
    pub max_actions: usize,

    /// Rule constants shared by every game.
    pub rules: RuleSet,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            total_games: 100,
            player_counts: vec![2, 3, 4],
            policies: vec!["random".to_string(), "greedy".to_string()],
            matchups: Vec::new(),
            difficulty: Difficulty::default(),
            seed: 0,
            concurrency: None,
            max_actions: DEFAULT_MAX_ACTIONS,
            rules: RuleSet::default(),
        }
    }
}

impl BatchConfig {
    /// Builder method: set total games.
    pub fn with_total_games(mut self, games: usize) -> Self {
        self.total_games = games;
        self
    }

    /// Builder method: set the tested participant counts.
    pub fn with_player_counts(mut self, counts: Vec<usize>) -> Self {
        self.player_counts = counts;
        self
    }

    /// Builder method: set the policy pool.
    pub fn with_policies<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.policies = names.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: add one explicit lineup.
    pub fn with_matchup<S: Into<String>>(mut self, lineup: impl IntoIterator<Item = S>) -> Self {
        self.matchups.push(lineup.into_iter().map(Into::into).collect());
        self
    }

    /// Builder method: set the difficulty tier.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Builder method: set the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method: set number of threads.
    pub fn with_concurrency(mut self, threads: usize) -> Self {
        self.concurrency = Some(threads);
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the batch as a whole.
    ///
    /// Individual matchups are not checked here; a bad one is reported in
    /// the batch result and skipped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_games == 0 {
            return Err(ConfigError::ZeroGames);
        }
        if self.player_counts.is_empty() {
            return Err(ConfigError::NoPlayerCounts);
        }
        for &count in &self.player_counts {
            check_player_count(count)?;
        }
        if self.matchups.is_empty() {
            if self.policies.is_empty() {
                return Err(ConfigError::NoPolicies);
            }
            for name in &self.policies {
                name.parse::<PolicyKind>()?;
            }
        }
        if self.concurrency == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.max_actions == 0 {
            return Err(ConfigError::ZeroMaxActions);
        }
        self.rules.validate()?;
        Ok(())
    }
}

fn check_player_count(count: usize) -> Result<(), ConfigError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPlayerCount(count))
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by configuration loading and validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(String),

    /// The JSON could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Participant count outside the supported range.
    #[error("invalid player count: {0} (must be 2-4)")]
    InvalidPlayerCount(usize),

    /// A lineup does not have one entry per seat.
    #[error("policy count mismatch: expected {expected}, got {actual}")]
    PolicyCountMismatch {
        /// Seats in the game.
        expected: usize,
        /// Policy names given.
        actual: usize,
    },

    /// A policy or difficulty name did not resolve.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The rule constants are inconsistent.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// The action cap is zero.
    #[error("max_actions must be positive")]
    ZeroMaxActions,

    /// The batch asks for no games.
    #[error("total_games must be positive")]
    ZeroGames,

    /// The batch tests no participant counts.
    #[error("player_counts is empty")]
    NoPlayerCounts,

    /// Neither a policy pool nor explicit matchups were given.
    #[error("no policies or matchups configured")]
    NoPolicies,

    /// Zero worker threads requested.
    #[error("concurrency must be positive")]
    ZeroConcurrency,

    /// The worker pool could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}
