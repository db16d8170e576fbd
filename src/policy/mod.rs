//! Decision policies.
//!
//! A [`Policy`] looks at a [`GameState`] and proposes the actions for the
//! acting participant's turn. The runner and the batch harness only see the
//! trait; which heuristic (or the tree search) sits behind it is a detail.
//!
//! Policies never need to pre-validate exhaustively: the engine rejects an
//! illegal proposal as a silent no-op and the runner substitutes Rest.
//!
//! ## Available policies
//!
//! | name         | type                   | idea                                    |
//! |--------------|------------------------|-----------------------------------------|
//! | `random`     | [`RandomPolicy`]       | uniform over legal actions              |
//! | `greedy`     | [`GreedyPolicy`]       | maximize immediate influence gain        |
//! | `weighted`   | [`WeightedPolicy`]     | linear scoring of every legal action     |
//! | `aggressive` | [`AggressivePolicy`]   | hit the leader, hold the center          |
//! | `defensive`  | [`DefensivePolicy`]    | avoid threatened ground                  |
//! | `mcts`       | [`MctsPolicy`](crate::mcts::MctsPolicy) | tree search            |

mod aggressive;
mod defensive;
mod greedy;
mod random;
mod weighted;

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{self, Action, GameState, LocationId};
use crate::mcts::{MctsConfig, MctsPolicy};

pub use aggressive::AggressivePolicy;
pub use defensive::DefensivePolicy;
pub use greedy::GreedyPolicy;
pub use random::RandomPolicy;
pub use weighted::{ScoringWeights, WeightedPolicy};

/// Something that picks a participant's actions for one turn.
///
/// Implementations must be shareable across worker threads; any randomness
/// comes from the `rng` argument so a seeded game replays exactly.
pub trait Policy: Send + Sync {
    /// Registry name of this policy.
    fn name(&self) -> &str;

    /// Propose up to [`actions_per_turn`](crate::engine::RuleSet::actions_per_turn)
    /// actions for `actor`. Fewer is allowed; the runner pads with Rest.
    fn choose(&self, state: &GameState, actor: usize, rng: &mut StdRng) -> Vec<Action>;
}

/// Errors raised while resolving a policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// No policy registered under this name.
    #[error("unknown policy '{0}'")]
    UnknownPolicy(String),

    /// No difficulty tier registered under this name.
    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),
}

/// Registered policy families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// [`RandomPolicy`]
    Random,
    /// [`GreedyPolicy`]
    Greedy,
    /// [`WeightedPolicy`]
    Weighted,
    /// [`AggressivePolicy`]
    Aggressive,
    /// [`DefensivePolicy`]
    Defensive,
    /// [`MctsPolicy`]
    Mcts,
}

impl PolicyKind {
    /// Every registered kind.
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Random,
        PolicyKind::Greedy,
        PolicyKind::Weighted,
        PolicyKind::Aggressive,
        PolicyKind::Defensive,
        PolicyKind::Mcts,
    ];

    /// Registry name.
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Random => "random",
            PolicyKind::Greedy => "greedy",
            PolicyKind::Weighted => "weighted",
            PolicyKind::Aggressive => "aggressive",
            PolicyKind::Defensive => "defensive",
            PolicyKind::Mcts => "mcts",
        }
    }

    /// Instantiate the policy. The difficulty only sizes the tree search.
    pub fn build(self, difficulty: Difficulty) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy),
            PolicyKind::Greedy => Box::new(GreedyPolicy),
            PolicyKind::Weighted => Box::new(WeightedPolicy::default()),
            PolicyKind::Aggressive => Box::new(AggressivePolicy),
            PolicyKind::Defensive => Box::new(DefensivePolicy),
            PolicyKind::Mcts => Box::new(MctsPolicy::new(difficulty.mcts_config())),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| PolicyError::UnknownPolicy(s.to_string()))
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named strength tier. Opaque to the engine; consumed by policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Random play.
    Easy,
    /// Greedy play.
    #[default]
    Normal,
    /// Weighted scoring.
    Hard,
    /// Tree search.
    Expert,
}

impl Difficulty {
    /// Policy used for seats that do not name one.
    pub fn default_policy(self) -> PolicyKind {
        match self {
            Difficulty::Easy => PolicyKind::Random,
            Difficulty::Normal => PolicyKind::Greedy,
            Difficulty::Hard => PolicyKind::Weighted,
            Difficulty::Expert => PolicyKind::Mcts,
        }
    }

    /// Search configuration for `mcts` seats at this tier.
    pub fn mcts_config(self) -> MctsConfig {
        let iterations = match self {
            Difficulty::Easy => 50,
            Difficulty::Normal => 200,
            Difficulty::Hard => 500,
            Difficulty::Expert => 1500,
        };
        MctsConfig::default().with_iterations(iterations)
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl FromStr for Difficulty {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            _ => Err(PolicyError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Resolve an optional seat policy name against a difficulty tier.
pub fn resolve(name: Option<&str>, difficulty: Difficulty) -> Result<PolicyKind, PolicyError> {
    match name {
        Some(name) => name.parse(),
        None => Ok(difficulty.default_policy()),
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Build a turn one action at a time, replaying each pick through the engine
/// so the next pick sees its effect.
///
/// Stops early once the turn has passed to someone else or the game ended.
pub(crate) fn plan_turn<F>(state: &GameState, actor: usize, mut pick: F) -> Vec<Action>
where
    F: FnMut(&GameState) -> Action,
{
    let mut actions = Vec::new();
    let mut scratch = state.clone();

    for _ in 0..state.rules.actions_per_turn {
        if scratch.is_terminal() || scratch.current != actor {
            break;
        }
        let action = pick(&scratch);
        scratch = engine::apply(&scratch, &action);
        actions.push(action);
    }
    actions
}

/// Number of rivals of `actor` able to challenge at `location`.
pub(crate) fn threat_count(state: &GameState, actor: usize, location: LocationId) -> usize {
    state
        .participants
        .iter()
        .filter(|p| p.id != actor)
        .filter(|p| p.archetype.ability().can_reach(p.location, location))
        .count()
}

/// Largest legal claim for the acting participant, if any.
pub(crate) fn best_claim(legal: &[Action]) -> Option<Action> {
    legal
        .iter()
        .filter_map(|a| match a {
            Action::Claim { amount } => Some(*amount),
            _ => None,
        })
        .max()
        .map(|amount| Action::Claim { amount })
}

/// Opponent of `actor` with the most influence, lowest seat on ties.
pub(crate) fn leader_among_rivals(state: &GameState, actor: usize) -> Option<usize> {
    state
        .participants
        .iter()
        .filter(|p| p.id != actor)
        .fold(None::<(usize, u32)>, |best, p| match best {
            Some((_, influence)) if influence >= p.influence => best,
            _ => Some((p.id, p.influence)),
        })
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Archetype, RuleSet};
    use rand::SeedableRng;

    fn game(players: usize, seed: u64) -> GameState {
        engine::new_game(RuleSet::default(), players, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_policy_names_round_trip() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.name().parse::<PolicyKind>(), Ok(kind));
            assert_eq!(kind.build(Difficulty::Easy).name(), kind.name());
        }
        assert_eq!(" Greedy ".parse::<PolicyKind>(), Ok(PolicyKind::Greedy));
        assert_eq!(
            "minimax".parse::<PolicyKind>(),
            Err(PolicyError::UnknownPolicy("minimax".to_string()))
        );
    }

    #[test]
    fn test_difficulty_defaults() {
        assert_eq!(resolve(None, Difficulty::Easy), Ok(PolicyKind::Random));
        assert_eq!(resolve(None, Difficulty::Expert), Ok(PolicyKind::Mcts));
        assert_eq!(resolve(Some("defensive"), Difficulty::Easy), Ok(PolicyKind::Defensive));
        assert!("legendary".parse::<Difficulty>().is_err());
        assert!(Difficulty::Expert.mcts_config().iterations > Difficulty::Easy.mcts_config().iterations);
    }

    #[test]
    fn test_plan_turn_stops_at_turn_end() {
        let state = game(2, 3);
        let actions = plan_turn(&state, 0, |_| Action::Rest);
        assert_eq!(actions, vec![Action::Rest, Action::Rest]);

        let actions = plan_turn(&state, 1, |_| Action::Rest);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_threat_count() {
        let mut state = game(3, 4);
        for p in &mut state.participants {
            p.location = 2;
        }
        assert_eq!(threat_count(&state, 0, 2), 2);
        assert_eq!(threat_count(&state, 0, 5), 0);

        // reach comes from the ability row
        state.participants[1].archetype = Archetype::Anubis;
        state.participants[2].archetype = Archetype::Ra;
        assert_eq!(threat_count(&state, 0, 1), 1);
        state.participants[1].archetype = Archetype::Seth;
        assert_eq!(threat_count(&state, 0, 1), 0);
    }

    #[test]
    fn test_leader_among_rivals() {
        let mut state = game(3, 4);
        assert_eq!(leader_among_rivals(&state, 0), Some(1));
        state.participants[2].influence = 4;
        assert_eq!(leader_among_rivals(&state, 0), Some(2));
        assert_eq!(leader_among_rivals(&state, 2), Some(0));
    }

    #[test]
    fn test_every_policy_proposes_legal_first_action() {
        let mut rng = StdRng::seed_from_u64(11);
        for kind in PolicyKind::ALL {
            let policy = kind.build(Difficulty::Easy);
            for seed in 0..5 {
                let state = game(3, seed);
                let actions = policy.choose(&state, 0, &mut rng);
                assert!(!actions.is_empty(), "{kind} proposed nothing");
                assert!(actions.len() <= 2);
                assert!(engine::is_legal(&state, &actions[0]), "{kind}: {}", actions[0]);
            }
        }
    }
}
