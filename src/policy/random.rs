use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::{self, Action, GameState};
use crate::policy::{plan_turn, Policy};

/// Uniformly random legal play. Also the default rollout policy for MCTS.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl RandomPolicy {
    /// Pick one legal action for whoever is acting in `state`.
    pub fn pick(state: &GameState, rng: &mut StdRng) -> Action {
        engine::legal_actions(state)
            .choose(rng)
            .copied()
            .unwrap_or(Action::Rest)
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose(&self, state: &GameState, actor: usize, rng: &mut StdRng) -> Vec<Action> {
        plan_turn(state, actor, |s| Self::pick(s, rng))
    }
}
