//! Configuration options for the tree search.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for [`MctsPolicy`](crate::mcts::MctsPolicy).
///
/// # Example
/// ```
/// use pantheon_sim::mcts::MctsConfig;
///
/// let config = MctsConfig::default().with_iterations(300).with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Search iterations per decision.
    pub iterations: u32,

    /// UCB1 exploration constant `C`.
    ///
    /// Larger values spread visits over more first-level actions; smaller
    /// values exploit the current best estimate sooner.
    pub exploration: f64,

    /// Deepest node the selection step will descend to.
    pub max_depth: usize,

    /// Maximum number of random actions played per rollout.
    pub rollout_depth: usize,

    /// Random seed for reproducibility.
    ///
    /// If set, every decision reseeds from this value and the state's
    /// round and turn position, so identical states yield identical
    /// choices. If `None`, the caller's generator is used.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 500,
            exploration: std::f64::consts::SQRT_2,
            max_depth: 64,
            rollout_depth: 200,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Builder method: set the iteration budget.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder method: set the exploration constant.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Builder method: set the rollout cap.
    pub fn with_rollout_depth(mut self, depth: usize) -> Self {
        self.rollout_depth = depth;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), MctsConfigError> {
        if self.iterations == 0 {
            return Err(MctsConfigError::ZeroIterations);
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(MctsConfigError::InvalidExploration(self.exploration));
        }
        if self.max_depth == 0 {
            return Err(MctsConfigError::ZeroDepth);
        }
        Ok(())
    }
}

/// Errors that can occur when validating a search configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MctsConfigError {
    /// The iteration budget is zero.
    #[error("iteration budget must be positive")]
    ZeroIterations,

    /// The exploration constant is negative or not finite.
    #[error("exploration constant {0} must be a finite non-negative number")]
    InvalidExploration(f64),

    /// The selection depth bound is zero.
    #[error("max depth must be positive")]
    ZeroDepth,
}
