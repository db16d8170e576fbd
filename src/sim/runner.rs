//! Drives a single game from deal to result.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{self, Action, ActionKind, Archetype, GameState, LocationId, Phase, RuleSet};
use crate::policy::Policy;
use crate::sim::config::{ConfigError, GameConfig};

/// One resolved (or rejected) action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Round in which the action was taken.
    pub round: u32,
    /// Acting seat.
    pub actor: usize,
    /// Acting seat's archetype.
    pub character: Archetype,
    /// Kind of the action.
    pub kind: ActionKind,
    /// The action as proposed.
    pub action: Action,
    /// Where the effect happened: destination, claim site, or the
    /// challenged location.
    pub location: LocationId,
    /// Change in the actor's gold.
    pub gold_delta: i64,
    /// Change in the actor's cumulative influence.
    pub influence_delta: i64,
    /// Change in the challenge target's influence; 0 for other kinds.
    pub target_influence_delta: i64,
    /// Whether the engine accepted the action.
    pub applied: bool,
}

/// Final standing of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResult {
    /// Seat index.
    pub seat: usize,
    /// Archetype dealt to the seat.
    pub character: Archetype,
    /// Name of the policy that played the seat.
    pub policy: String,
    /// Final cumulative influence.
    pub total_influence: u32,
    /// Final gold.
    pub gold: u32,
}

/// Everything a finished game reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Seed the game was played with.
    pub seed: u64,
    /// Winning seat.
    pub winner: Option<usize>,
    /// Rounds played.
    pub rounds: u32,
    /// Final standings in seat order.
    pub participants: Vec<ParticipantResult>,
    /// Every action in order.
    pub trace: Vec<TraceEntry>,
    /// Whether the safety cap ended the game.
    pub capped: bool,
}

impl GameResult {
    /// Number of participants.
    pub fn player_count(&self) -> usize {
        self.participants.len()
    }

    /// Archetype of the winner.
    pub fn winner_character(&self) -> Option<Archetype> {
        self.winner
            .and_then(|seat| self.participants.get(seat))
            .map(|p| p.character)
    }

    /// Policy name of the winner.
    pub fn winner_policy(&self) -> Option<&str> {
        self.winner
            .and_then(|seat| self.participants.get(seat))
            .map(|p| p.policy.as_str())
    }

    /// Whether any seat was played by `policy`.
    pub fn has_policy(&self, policy: &str) -> bool {
        self.participants.iter().any(|p| p.policy == policy)
    }
}

/// Run a game described by `config`.
///
/// Only configuration problems are errors; once started a game always
/// produces a result.
pub fn run_game(config: &GameConfig) -> Result<GameResult, ConfigError> {
    config.validate()?;
    let policies: Vec<Box<dyn Policy>> = config
        .resolved_policies()?
        .into_iter()
        .map(|kind| kind.build(config.difficulty))
        .collect();
    let seed = config.seed.unwrap_or_else(rand::random);
    Ok(run_with_policies(config.rules, &policies, seed, config.max_actions))
}

/// Run one game with one policy per seat.
///
/// Each turn the acting seat's policy is asked once. Proposed actions are
/// applied in order; a rejected one is traced with `applied = false` and
/// replaced by Rest, and a short proposal is padded with Rest. The game ends
/// at a terminal state or after `max_actions` resolved actions, in which
/// case the tiebreak leader is declared the winner. A seat count outside
/// `2..=4` never leaves setup and yields an empty, capped result.
pub fn run_with_policies(
    rules: RuleSet,
    policies: &[Box<dyn Policy>],
    seed: u64,
    max_actions: usize,
) -> GameResult {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = engine::new_game(rules, policies.len(), &mut rng);
    let mut trace = Vec::new();
    let mut resolved = 0usize;

    while state.phase == Phase::InTurn && resolved < max_actions {
        let actor = state.current;
        let Some(policy) = policies.get(actor) else {
            break;
        };
        let mut proposal = policy.choose(&state, actor, &mut rng).into_iter();

        while !state.is_terminal() && state.current == actor && resolved < max_actions {
            let action = proposal.next().unwrap_or(Action::Rest);
            if !engine::is_legal(&state, &action) {
                trace.push(record(&state, &state, action, false));
                let rested = engine::apply(&state, &Action::Rest);
                trace.push(record(&state, &rested, Action::Rest, true));
                state = rested;
            } else {
                let next = engine::apply(&state, &action);
                trace.push(record(&state, &next, action, true));
                state = next;
            }
            resolved += 1;
        }
    }

    let capped = !state.is_terminal();
    let winner = if capped {
        let leader = engine::tiebreak_leader(&state);
        warn!(seed, resolved, round = state.round, "game hit the action cap");
        leader
    } else {
        state.winner
    };

    let participants = state
        .participants
        .iter()
        .map(|p| ParticipantResult {
            seat: p.id,
            character: p.archetype,
            policy: policies.get(p.id).map_or_else(String::new, |pol| pol.name().to_string()),
            total_influence: p.influence,
            gold: p.gold,
        })
        .collect();

    let result = GameResult {
        seed,
        winner,
        rounds: state.rounds_played(),
        participants,
        trace,
        capped,
    };
    debug!(
        seed,
        winner = ?result.winner,
        rounds = result.rounds,
        actions = result.trace.len(),
        "game finished"
    );
    result
}

fn record(before: &GameState, after: &GameState, action: Action, applied: bool) -> TraceEntry {
    let actor = before.current;
    let me_before = &before.participants[actor];
    let me_after = &after.participants[actor];

    let (location, target_influence_delta) = match action {
        Action::Move { to } => (to, 0),
        Action::Claim { .. } | Action::Rest => (me_before.location, 0),
        Action::Challenge { target } => match (before.participants.get(target), after.participants.get(target)) {
            (Some(t_before), Some(t_after)) => (
                t_before.location,
                i64::from(t_after.influence) - i64::from(t_before.influence),
            ),
            _ => (me_before.location, 0),
        },
    };

    TraceEntry {
        round: before.round,
        actor,
        character: me_before.archetype,
        kind: action.kind(),
        action,
        location,
        gold_delta: i64::from(me_after.gold) - i64::from(me_before.gold),
        influence_delta: i64::from(me_after.influence) - i64::from(me_before.influence),
        target_influence_delta,
        applied,
    }
}
