use std::cmp::Ordering;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Action, ActionKind, GameState, LocationId};
use crate::policy::{threat_count, Policy};

/// Weights of the linear action score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight on influence gained by a claim.
    pub claim: f64,
    /// Weight on how uncontested the resulting position is.
    pub position: f64,
    /// Weight on influence taken from rivals.
    pub disruption: f64,
    /// Penalty per gold spent.
    pub cost: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            claim: 1.0,
            position: 0.5,
            disruption: 0.8,
            cost: 0.1,
        }
    }
}

/// Scores every legal action on the current state and plays the top two.
///
/// If the top two contain no claim but a claim is legal, the best claim
/// replaces the second pick. Two moves are never paired since the second
/// would be scored from the wrong location.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedPolicy {
    /// Scoring weights.
    pub weights: ScoringWeights,
}

impl WeightedPolicy {
    /// Create a policy with custom weights.
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Score of `action` for `actor` in `state`.
    pub fn score(&self, state: &GameState, actor: usize, action: &Action) -> f64 {
        let w = &self.weights;
        let rules = &state.rules;
        let me = &state.participants[actor];
        let after = engine::apply(state, action);
        let spent = f64::from(me.gold.saturating_sub(after.participants[actor].gold));
        let rivals = (state.player_count().saturating_sub(1)).max(1) as f64;
        let max_influence = f64::from(rules.max_influence);

        let uncontested = |location: LocationId| {
            1.0 - threat_count(state, actor, location) as f64 / rivals
        };

        let value = match *action {
            Action::Claim { .. } => {
                let gained = f64::from(after.participants[actor].influence - me.influence);
                w.claim * gained / max_influence + w.position * uncontested(me.location)
            }
            Action::Move { to } => {
                let room = f64::from(state.board[to].room_for(actor)) / max_influence;
                w.position * uncontested(to) * room
            }
            Action::Challenge { target } => {
                let victim = &state.participants[target];
                let leader_share =
                    f64::from(victim.influence) / f64::from(rules.influence_to_win.max(1));
                w.disruption * (1.0 / max_influence + leader_share)
            }
            Action::Rest => {
                if me.gold == 0 {
                    0.5
                } else {
                    0.1
                }
            }
        };
        value - w.cost * spent
    }

    fn select(&self, state: &GameState, actor: usize) -> Vec<Action> {
        let mut ranked: Vec<(Action, f64)> = engine::legal_actions(state)
            .into_iter()
            .map(|a| (a, self.score(state, actor, &a)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let Some(&(first, _)) = ranked.first() else {
            return Vec::new();
        };

        let best_where = |pred: &dyn Fn(&Action) -> bool| {
            ranked.iter().skip(1).map(|(a, _)| *a).find(|a| pred(a))
        };

        let mut second = ranked.get(1).map(|(a, _)| *a);
        if first.kind() == ActionKind::Move && second.map(|a| a.kind()) == Some(ActionKind::Move) {
            second = best_where(&|a: &Action| a.kind() != ActionKind::Move);
        }

        let has_claim = first.kind() == ActionKind::Claim
            || second.map(|a| a.kind()) == Some(ActionKind::Claim);
        if !has_claim {
            if let Some(claim) = best_where(&|a: &Action| a.kind() == ActionKind::Claim) {
                second = Some(claim);
            }
        }

        std::iter::once(first).chain(second).collect()
    }
}

impl Policy for WeightedPolicy {
    fn name(&self) -> &str {
        "weighted"
    }

    fn choose(&self, state: &GameState, actor: usize, _rng: &mut StdRng) -> Vec<Action> {
        if state.current != actor {
            return Vec::new();
        }
        self.select(state, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleSet;
    use rand::SeedableRng;

    fn state() -> GameState {
        engine::new_game(RuleSet::default(), 2, &mut StdRng::seed_from_u64(6))
    }

    #[test]
    fn test_weighted_always_claims_when_possible() {
        let state = state();
        let actions = WeightedPolicy::default().choose(&state, 0, &mut StdRng::seed_from_u64(0));
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().any(|a| a.kind() == ActionKind::Claim));
    }

    #[test]
    fn test_never_pairs_two_moves() {
        let mut state = state();
        state.board[1].influence[0] = 3;
        state.participants[0].influence = 3;
        let actions = WeightedPolicy::default().choose(&state, 0, &mut StdRng::seed_from_u64(0));
        let moves = actions.iter().filter(|a| a.kind() == ActionKind::Move).count();
        assert!(moves <= 1);
    }

    #[test]
    fn test_bigger_claim_scores_higher() {
        let state = state();
        let policy = WeightedPolicy::default();
        let small = policy.score(&state, 0, &Action::Claim { amount: 1 });
        let big = policy.score(&state, 0, &Action::Claim { amount: 3 });
        assert!(big > small);
    }

    #[test]
    fn test_not_my_turn() {
        let state = state();
        assert!(WeightedPolicy::default()
            .choose(&state, 1, &mut StdRng::seed_from_u64(0))
            .is_empty());
    }
}
