use rand::rngs::StdRng;

use crate::engine::{self, Action, GameState, LocationId};
use crate::policy::{best_claim, plan_turn, Policy};

/// Takes whatever raises its own influence the most right now.
///
/// With nothing to claim it either walks to the cheapest location that still
/// has room (when the current one is full) or rests.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    fn pick(state: &GameState, actor: usize) -> Action {
        let legal = engine::legal_actions(state);
        if let Some(claim) = best_claim(&legal) {
            return claim;
        }

        let me = &state.participants[actor];
        let here_full = state.board[me.location].room_for(actor) == 0;
        if here_full && me.gold > 0 {
            if let Some(to) = Self::roomiest_destination(state, actor, &legal) {
                return Action::Move { to };
            }
        }
        Action::Rest
    }

    /// Legal destination with the most room, preferring free moves.
    fn roomiest_destination(state: &GameState, actor: usize, legal: &[Action]) -> Option<LocationId> {
        let gold_before = state.participants[actor].gold;
        legal
            .iter()
            .filter_map(|a| match a {
                Action::Move { to } => Some(*to),
                _ => None,
            })
            .filter(|&to| state.board[to].room_for(actor) > 0)
            .max_by_key(|&to| {
                let after = engine::apply(state, &Action::Move { to });
                let cost = gold_before.saturating_sub(after.participants[actor].gold);
                (state.board[to].room_for(actor), std::cmp::Reverse(cost), std::cmp::Reverse(to))
            })
    }
}

impl Policy for GreedyPolicy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose(&self, state: &GameState, actor: usize, _rng: &mut StdRng) -> Vec<Action> {
        plan_turn(state, actor, |s| Self::pick(s, actor))
    }
}
