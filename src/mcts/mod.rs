//! Monte Carlo tree search policy.
//!
//! # Overview
//!
//! For every decision a fresh tree is grown from the current state. Each
//! iteration runs four steps:
//!
//! 1. **Selection**: descend through fully expanded nodes by UCB1
//! 2. **Expansion**: attach one random untried action
//! 3. **Rollout**: play uniformly random moves to the end or a depth cap
//! 4. **Backpropagation**: add the score to every node on the path
//!
//! ```text
//! UCB1(child) = mean(child) + C * sqrt(ln(visits(parent)) / visits(child))
//! ```
//!
//! Scores are always taken from the point of view of the participant the
//! search runs for. After the budget is spent the two most visited root
//! children become the turn.
//!
//! # Example
//!
//! ```
//! use pantheon_sim::engine::{self, RuleSet};
//! use pantheon_sim::mcts::{MctsConfig, MctsPolicy};
//! use pantheon_sim::policy::Policy;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let state = engine::new_game(RuleSet::default(), 2, &mut rng);
//! let policy = MctsPolicy::new(MctsConfig::default().with_iterations(64).with_seed(9));
//! let turn = policy.choose(&state, 0, &mut rng);
//! assert_eq!(turn.len(), 2);
//! ```

pub mod config;
pub mod search;
pub mod tree;

pub use config::{MctsConfig, MctsConfigError};
pub use search::{evaluate, MctsPolicy, SearchStats};
pub use tree::{MctsNode, MctsTree, NodeId};
