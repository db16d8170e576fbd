use rand::rngs::StdRng;

use crate::engine::{self, Action, GameState, Topology};
use crate::policy::{best_claim, leader_among_rivals, plan_turn, Policy};

/// Goes after the leader and fights for Karnak.
///
/// Priority: challenge the leading rival, challenge anyone at or above our
/// own influence, claim at the center, chase the leader, head for the
/// center, claim wherever we stand, rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggressivePolicy;

impl AggressivePolicy {
    fn pick(state: &GameState, actor: usize) -> Action {
        let legal = engine::legal_actions(state);
        let me = &state.participants[actor];
        let leader = leader_among_rivals(state, actor);

        if let Some(target) = leader {
            let hit = Action::Challenge { target };
            if legal.contains(&hit) {
                return hit;
            }
        }

        let rival_hit = legal
            .iter()
            .filter_map(|a| match a {
                Action::Challenge { target } => Some(*target),
                _ => None,
            })
            .filter(|&t| state.participants[t].influence >= me.influence)
            .max_by_key(|&t| (state.participants[t].influence, std::cmp::Reverse(t)));
        if let Some(target) = rival_hit {
            return Action::Challenge { target };
        }

        let claim = best_claim(&legal);
        if me.location == Topology::CENTER {
            if let Some(claim) = claim {
                return claim;
            }
        }

        if let Some(target) = leader {
            let victim = &state.participants[target];
            let chase = Action::Move { to: victim.location };
            if victim.influence > 0
                && state.influence_at(victim.location, target) > 0
                && legal.contains(&chase)
            {
                return chase;
            }
        }

        let to_center = Action::Move { to: Topology::CENTER };
        if legal.contains(&to_center) && state.board[Topology::CENTER].room_for(actor) > 0 {
            return to_center;
        }

        claim.unwrap_or(Action::Rest)
    }
}

impl Policy for AggressivePolicy {
    fn name(&self) -> &str {
        "aggressive"
    }

    fn choose(&self, state: &GameState, actor: usize, _rng: &mut StdRng) -> Vec<Action> {
        plan_turn(state, actor, |s| Self::pick(s, actor))
    }
}
