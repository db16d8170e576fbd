use rand::rngs::StdRng;

use crate::engine::{self, Action, GameState, LocationId};
use crate::policy::{best_claim, plan_turn, threat_count, Policy};

/// Stays off contested ground.
///
/// Counts the rivals able to challenge at each candidate location. When
/// the current spot is threatened it moves to the least threatened
/// affordable location with room; otherwise it claims, relocates when full,
/// or rests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefensivePolicy;

impl DefensivePolicy {
    fn safest_destination(state: &GameState, actor: usize, legal: &[Action]) -> Option<(LocationId, usize)> {
        let gold = state.participants[actor].gold;
        legal
            .iter()
            .filter_map(|a| match a {
                Action::Move { to } => Some(*to),
                _ => None,
            })
            .filter(|&to| state.board[to].room_for(actor) > 0)
            .map(|to| {
                let after = engine::apply(state, &Action::Move { to });
                let cost = gold.saturating_sub(after.participants[actor].gold);
                (to, threat_count(state, actor, to), cost)
            })
            .min_by_key(|&(to, threat, cost)| (threat, cost, to))
            .map(|(to, threat, _)| (to, threat))
    }

    fn pick(state: &GameState, actor: usize) -> Action {
        let legal = engine::legal_actions(state);
        let me = &state.participants[actor];
        let here = threat_count(state, actor, me.location);

        if here > 0 {
            if let Some((to, threat)) = Self::safest_destination(state, actor, &legal) {
                if threat < here {
                    return Action::Move { to };
                }
            }
        }

        if let Some(claim) = best_claim(&legal) {
            return claim;
        }

        if state.board[me.location].room_for(actor) == 0 {
            if let Some((to, _)) = Self::safest_destination(state, actor, &legal) {
                return Action::Move { to };
            }
        }
        Action::Rest
    }
}

impl Policy for DefensivePolicy {
    fn name(&self) -> &str {
        "defensive"
    }

    fn choose(&self, state: &GameState, actor: usize, _rng: &mut StdRng) -> Vec<Action> {
        plan_turn(state, actor, |s| Self::pick(s, actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Archetype, RuleSet};
    use rand::SeedableRng;

    fn state() -> GameState {
        let mut state = engine::new_game(RuleSet::default(), 2, &mut StdRng::seed_from_u64(21));
        state.participants[0].archetype = Archetype::Ra;
        state.participants[1].archetype = Archetype::Isis;
        state
    }

    #[test]
    fn test_claims_when_safe() {
        let state = state();
        let actions = DefensivePolicy.choose(&state, 0, &mut StdRng::seed_from_u64(0));
        assert_eq!(actions[0], Action::Claim { amount: 3 });
    }

    #[test]
    fn test_steps_away_from_rival() {
        let mut state = state();
        state.participants[1].location = 1;
        let actions = DefensivePolicy.choose(&state, 0, &mut StdRng::seed_from_u64(0));
        match actions[0] {
            Action::Move { to } => assert_eq!(threat_count(&state, 0, to), 0),
            other => panic!("expected a move, got {other}"),
        }
    }
}
