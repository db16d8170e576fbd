//! The search loop and its [`Policy`] adapter.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::engine::{self, Action, GameState};
use crate::mcts::config::MctsConfig;
use crate::mcts::tree::{MctsTree, NodeId};
use crate::policy::{Policy, RandomPolicy};

/// Normalizer for gold in the heuristic evaluation.
const GOLD_SCALE: f64 = 10.0;

/// Diagnostics for one search.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Iterations completed.
    pub iterations: u32,
    /// Nodes in the final tree.
    pub nodes: usize,
    /// Deepest node created.
    pub max_depth: usize,
    /// Wall time spent searching.
    pub elapsed: Duration,
}

/// Monte Carlo tree search with UCB1 selection and random rollouts.
///
/// A fresh tree is grown for every decision. The two most visited
/// first-level actions become the turn, padded with Rest.
#[derive(Debug, Clone, Default)]
pub struct MctsPolicy {
    config: MctsConfig,
}

impl MctsPolicy {
    /// Create a policy with `config`.
    pub fn new(config: MctsConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Run a full search for `actor` and return the chosen actions with
    /// search diagnostics.
    ///
    /// Returns no actions when `actor` is not the one to act.
    pub fn search(&self, state: &GameState, actor: usize, rng: &mut StdRng) -> (Vec<Action>, SearchStats) {
        if state.is_terminal() || state.current != actor {
            return (Vec::new(), SearchStats::default());
        }

        let mut seeded;
        let rng = match self.config.seed {
            Some(seed) => {
                seeded = StdRng::seed_from_u64(decision_seed(seed, state));
                &mut seeded
            }
            None => rng,
        };

        let start = Instant::now();
        let mut tree = MctsTree::new(state.clone());
        let mut max_depth = 0;

        for _ in 0..self.config.iterations {
            let leaf = self.select(&tree);
            let leaf = self.expand(&mut tree, leaf, rng);
            max_depth = max_depth.max(tree.node(leaf).depth);

            let outcome = self.rollout(&tree.node(leaf).state, rng);
            let score = evaluate(&outcome, actor);
            tree.backpropagate(leaf, score);
        }

        let per_turn = state.rules.actions_per_turn as usize;
        let mut actions = tree.most_visited(per_turn);
        actions.resize(per_turn, Action::Rest);

        let stats = SearchStats {
            iterations: self.config.iterations,
            nodes: tree.len(),
            max_depth,
            elapsed: start.elapsed(),
        };
        (actions, stats)
    }

    /// Descend while the node is fully expanded and has children.
    fn select(&self, tree: &MctsTree) -> NodeId {
        let mut id = NodeId::ROOT;
        loop {
            let node = tree.node(id);
            if !node.is_fully_expanded() || !node.has_children() || node.depth >= self.config.max_depth {
                return id;
            }
            match tree.select_child(id, self.config.exploration) {
                Some(child) => id = child,
                None => return id,
            }
        }
    }

    /// Expand one random untried action, or return `id` when there is none.
    fn expand(&self, tree: &mut MctsTree, id: NodeId, rng: &mut StdRng) -> NodeId {
        let node = tree.node(id);
        if node.untried().is_empty() || node.depth >= self.config.max_depth {
            return id;
        }
        let index = rng.gen_range(0..node.untried().len());
        tree.expand(id, index).unwrap_or(id)
    }

    /// Play uniformly random moves for everyone.
    fn rollout(&self, state: &GameState, rng: &mut StdRng) -> GameState {
        let mut state = state.clone();
        for _ in 0..self.config.rollout_depth {
            if state.is_terminal() {
                break;
            }
            let action = RandomPolicy::pick(&state, rng);
            state = engine::apply(&state, &action);
        }
        state
    }
}

impl Policy for MctsPolicy {
    fn name(&self) -> &str {
        "mcts"
    }

    fn choose(&self, state: &GameState, actor: usize, rng: &mut StdRng) -> Vec<Action> {
        let (actions, stats) = self.search(state, actor, rng);
        trace!(
            actor,
            round = state.round,
            nodes = stats.nodes,
            depth = stats.max_depth,
            elapsed_us = stats.elapsed.as_micros() as u64,
            ?actions,
            "mcts decision"
        );
        actions
    }
}

/// Per-decision seed derived from the configured seed and the turn position.
fn decision_seed(seed: u64, state: &GameState) -> u64 {
    seed ^ (u64::from(state.round) << 32)
        ^ ((state.current as u64) << 8)
        ^ u64::from(state.actions_taken)
}

/// Score of `state` for `actor` in `[0, 1]`.
///
/// A finished game scores 1 for a win and 0 otherwise. An unfinished one
/// blends normalized influence (0.4), influence relative to the leader (0.3),
/// normalized gold (0.1) and influence at the current location (0.2).
pub fn evaluate(state: &GameState, actor: usize) -> f64 {
    if state.is_terminal() {
        return if state.winner == Some(actor) { 1.0 } else { 0.0 };
    }
    let Some(me) = state.participants.get(actor) else {
        return 0.0;
    };
    let rules = &state.rules;

    let influence = f64::from(me.influence) / f64::from(rules.influence_to_win.max(1));
    let leader = state
        .participants
        .iter()
        .map(|p| p.influence)
        .max()
        .unwrap_or(0);
    let relative = if leader == 0 {
        1.0
    } else {
        f64::from(me.influence) / f64::from(leader)
    };
    let gold = f64::from(me.gold) / GOLD_SCALE;
    let local = f64::from(state.influence_at(me.location, actor)) / f64::from(rules.max_influence.max(1));

    (0.4 * influence.min(1.0) + 0.3 * relative + 0.1 * gold.min(1.0) + 0.2 * local).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ActionKind, RuleSet};

    fn game(seed: u64) -> GameState {
        engine::new_game(RuleSet::default(), 3, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_seeded_search_is_deterministic() {
        let state = game(4);
        let policy = MctsPolicy::new(MctsConfig::default().with_iterations(120).with_seed(7));
        let a = policy.choose(&state, 0, &mut StdRng::seed_from_u64(1));
        let b = policy.choose(&state, 0, &mut StdRng::seed_from_u64(999));
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_stats_reflect_budget() {
        let state = game(4);
        let policy = MctsPolicy::new(MctsConfig::default().with_iterations(40).with_seed(1));
        let (_, stats) = policy.search(&state, 0, &mut StdRng::seed_from_u64(0));
        assert_eq!(stats.iterations, 40);
        assert!(stats.nodes > 1 && stats.nodes <= 41);
        assert!(stats.max_depth >= 1);
    }

    #[test]
    fn test_finds_winning_claim() {
        let mut state = game(5);
        for location in [2, 3, 4, 5, 6] {
            state.board[location].influence[0] = 2;
        }
        state.board[0].influence[0] = 1;
        state.participants[0].influence = 11;
        state.participants[0].location = 1;
        let policy = MctsPolicy::new(MctsConfig::default().with_iterations(300).with_seed(3));
        let actions = policy.choose(&state, 0, &mut StdRng::seed_from_u64(0));
        assert_eq!(actions[0].kind(), ActionKind::Claim);
    }

    #[test]
    fn test_single_child_is_padded_with_rest() {
        let state = game(4);
        let policy = MctsPolicy::new(MctsConfig::default().with_iterations(1).with_seed(8));
        let (actions, stats) = policy.search(&state, 0, &mut StdRng::seed_from_u64(0));
        assert_eq!(stats.nodes, 2);
        assert_eq!(actions.len(), 2);
        assert!(engine::is_legal(&state, &actions[0]));
        assert_eq!(actions[1], Action::Rest);
    }

    #[test]
    fn test_not_my_turn() {
        let state = game(4);
        let policy = MctsPolicy::new(MctsConfig::default().with_iterations(10));
        assert!(policy.choose(&state, 2, &mut StdRng::seed_from_u64(0)).is_empty());
    }

    #[test]
    fn test_evaluate_bounds() {
        let mut state = game(6);
        let fresh = evaluate(&state, 0);
        assert!((0.0..=1.0).contains(&fresh));

        state.participants[1].influence = 5;
        assert!(evaluate(&state, 0) < fresh);

        state.phase = engine::Phase::Terminal;
        state.winner = Some(0);
        assert_eq!(evaluate(&state, 0), 1.0);
        assert_eq!(evaluate(&state, 1), 0.0);
    }
}
