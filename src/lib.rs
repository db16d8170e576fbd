//! # Pantheon Sim
//!
//! A rules engine and simulation harness for a small turn-based
//! territorial-control game, plus the tooling to play it automatically at
//! scale and study the outcome.
//!
//! ## Features
//!
//! - **Pure Rules Engine**: `apply(state, action) -> state`, total and
//!   deterministic; illegal actions come back unchanged
//! - **Pluggable Policies**: random, greedy, weighted scoring, aggressive,
//!   defensive and Monte Carlo tree search behind one trait
//! - **Parallel Batches**: thousands of independent seeded games on a rayon
//!   pool, summarized per lineup
//! - **Analysis**: archetype balance, action success, first-player advantage
//!   and an empirical mixed equilibrium over action kinds
//!
//! ## Quick Start
//!
//! ```
//! use pantheon_sim::analysis::analyze;
//! use pantheon_sim::sim::{run_batch, BatchConfig};
//!
//! let config = BatchConfig::default()
//!     .with_total_games(6)
//!     .with_player_counts(vec![2, 3])
//!     .with_policies(["greedy", "weighted"])
//!     .with_seed(42);
//!
//! let batch = run_batch(&config).unwrap();
//! let report = analyze(&batch.results);
//! assert_eq!(report.games, 6);
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: game state, actions and the transition function
//! - [`policy`]: the `Policy` trait and heuristic policies
//! - [`mcts`]: tree-search policy
//! - [`sim`]: single-game runner, batch harness, result stores
//! - [`analysis`]: statistics and equilibrium solver
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Batch Harness (rayon)                       │
//! │  - config expansion        - progress callback                  │
//! │  - seed per game           - per-lineup summaries               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │ one job per game
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │      Game Runner        │──── trace ───▶ ResultStore
//!                  └─────────────────────────┘
//!                     │                  │
//!           choose()  ▼                  ▼  apply()
//!              ┌────────────┐      ┌─────────────┐
//!              │  Policies  │─────▶│ Rules Engine│
//!              │ (+ MCTS)   │ sim  └─────────────┘
//!              └────────────┘
//!                               │ after the batch
//!                               ▼
//!                  ┌─────────────────────────┐
//!                  │ Statistics / Equilibrium│
//!                  └─────────────────────────┘
//! ```

#![warn(missing_docs)]

/// Analysis of finished games.
pub mod analysis;

/// Rules engine: state, actions, transition function.
pub mod engine;

/// Tree-search policy.
pub mod mcts;

/// Decision policies.
pub mod policy;

/// Runner, batch harness and persistence.
pub mod sim;

// Re-export commonly used types at crate root for convenience
pub use analysis::{analyze, AnalysisReport};
pub use engine::{Action, ActionKind, Archetype, GameState, Phase, RuleSet};
pub use mcts::{MctsConfig, MctsPolicy};
pub use policy::{Difficulty, Policy, PolicyKind};
pub use sim::{run_batch, run_game, BatchConfig, BatchResult, GameConfig, GameResult};
