//! Simulation runner, batch harness and result persistence.
//!
//! ## Modules
//!
//! - [`config`]: `GameConfig` / `BatchConfig` with JSON loading
//! - [`runner`]: one game end to end, with a full action trace
//! - [`batch`]: many games on a rayon pool, summarized per lineup
//! - [`store`]: `ResultStore` contract with memory and JSON-lines backends
//!
//! # Example
//!
//! ```
//! use pantheon_sim::sim::{run_batch, BatchConfig};
//!
//! let config = BatchConfig::default()
//!     .with_total_games(4)
//!     .with_player_counts(vec![2])
//!     .with_policies(["greedy", "random"])
//!     .with_seed(1);
//! let batch = run_batch(&config).unwrap();
//! assert_eq!(batch.total_games, 4);
//! ```

pub mod batch;
pub mod config;
pub mod runner;
pub mod store;

pub use batch::{run_batch, run_batch_with_progress, BatchError, BatchResult, ConfigSummary};
pub use config::{BatchConfig, ConfigError, GameConfig, DEFAULT_MAX_ACTIONS};
pub use runner::{run_game, run_with_policies, GameResult, ParticipantResult, TraceEntry};
pub use store::{JsonLinesStore, MemoryStore, ResultFilter, ResultStore, StoreError};
