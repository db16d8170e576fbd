//! Tunable rule constants.
//!
//! The engine never hard-codes a threshold or a price; it reads them from a
//! [`RuleSet`] carried inside every [`GameState`](crate::engine::GameState).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule constants consulted by the transition function.
///
/// # Example
/// ```
/// use pantheon_sim::engine::RuleSet;
///
/// let rules = RuleSet::default();
/// assert_eq!(rules.influence_to_win, 12);
/// assert!(rules.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Per-participant influence capacity of a single location.
    pub max_influence: u32,

    /// Cumulative influence that wins the game immediately.
    pub influence_to_win: u32,

    /// Number of locations held at full capacity that wins immediately.
    pub locations_to_win: usize,

    /// Rounds that must complete before the round-limit victory applies.
    pub round_limit: u32,

    /// Resolved actions per turn.
    pub actions_per_turn: u32,

    /// Gold granted by a Rest action.
    pub rest_gold: u32,

    /// Base gold cost of moving to a non-adjacent location.
    pub move_cost: u32,

    /// Base gold cost of a challenge. Discounts never push it below 1.
    pub challenge_cost: u32,

    /// Gold each participant starts with.
    pub starting_gold: u32,

    /// Gold paid out by a tribute trigger.
    pub tribute_gold: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            max_influence: 3,
            influence_to_win: 12,
            locations_to_win: 3,
            round_limit: 20,
            actions_per_turn: 2,
            rest_gold: 2,
            move_cost: 1,
            challenge_cost: 2,
            starting_gold: 3,
            tribute_gold: 1,
        }
    }
}

impl RuleSet {
    /// Create the reference rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the round limit.
    pub fn with_round_limit(mut self, rounds: u32) -> Self {
        self.round_limit = rounds;
        self
    }

    /// Builder method: set the cumulative-influence victory threshold.
    pub fn with_influence_to_win(mut self, influence: u32) -> Self {
        self.influence_to_win = influence;
        self
    }

    /// Builder method: set starting gold.
    pub fn with_starting_gold(mut self, gold: u32) -> Self {
        self.starting_gold = gold;
        self
    }

    /// Validate the rule set.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.max_influence == 0 {
            return Err(RulesError::ZeroCapacity);
        }
        if self.influence_to_win == 0 {
            return Err(RulesError::ZeroThreshold("influence_to_win"));
        }
        if self.locations_to_win == 0 {
            return Err(RulesError::ZeroThreshold("locations_to_win"));
        }
        if self.round_limit == 0 {
            return Err(RulesError::ZeroThreshold("round_limit"));
        }
        if self.actions_per_turn == 0 {
            return Err(RulesError::NoActionsPerTurn);
        }
        Ok(())
    }
}

/// Errors that can occur when validating a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// Locations would hold no influence at all.
    #[error("max_influence must be at least 1")]
    ZeroCapacity,

    /// A victory threshold of zero ends every game before it starts.
    #[error("{0} must be at least 1")]
    ZeroThreshold(&'static str),

    /// A turn with no actions never hands over control.
    #[error("actions_per_turn must be at least 1")]
    NoActionsPerTurn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        assert!(RuleSet::default().validate().is_ok());
    }

    #[test]
    fn test_zero_thresholds_rejected() {
        let rules = RuleSet::default().with_round_limit(0);
        assert_eq!(rules.validate(), Err(RulesError::ZeroThreshold("round_limit")));

        let rules = RuleSet {
            max_influence: 0,
            ..RuleSet::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::ZeroCapacity));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let rules: RuleSet = serde_json::from_str(r#"{"round_limit": 5}"#).unwrap();
        assert_eq!(rules.round_limit, 5);
        assert_eq!(rules.max_influence, 3);
    }
}
