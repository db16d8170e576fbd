//! Game state snapshot.

use serde::Serialize;

use crate::engine::action::Action;
use crate::engine::archetype::Archetype;
use crate::engine::board::{Location, LocationId};
use crate::engine::rules::RuleSet;

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Board built, participants being dealt.
    Setup,
    /// Participants taking turns.
    InTurn,
    /// A winner has been declared. Absorbing.
    Terminal,
}

/// One competing actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    /// Seat index, also the turn-order position.
    pub id: usize,
    /// Character dealt at setup; fixed for the game.
    pub archetype: Archetype,
    /// Current location.
    pub location: LocationId,
    /// Gold balance.
    pub gold: u32,
    /// Cumulative influence, kept equal to the sum over the board.
    pub influence: u32,
    /// Whether a policy (rather than a person) drives this seat.
    pub policy_controlled: bool,
}

/// The authoritative snapshot of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Current phase.
    pub phase: Phase,
    /// Index of the acting participant.
    pub current: usize,
    /// All participants in seat order.
    pub participants: Vec<Participant>,
    /// The board.
    pub board: Vec<Location>,
    /// Round counter, starting at 1.
    pub round: u32,
    /// Actions the current participant has resolved this turn.
    pub actions_taken: u32,
    /// Action staged by an external two-step UI. The engine only clears it.
    pub pending: Option<Action>,
    /// Winner once terminal.
    pub winner: Option<usize>,
    /// Rule constants for this game.
    pub rules: RuleSet,
}

impl GameState {
    /// Fresh state in the `Setup` phase with an empty board.
    pub fn setup(rules: RuleSet) -> Self {
        Self {
            phase: Phase::Setup,
            current: 0,
            participants: Vec::new(),
            board: Location::board(0, rules.max_influence),
            round: 1,
            actions_taken: 0,
            pending: None,
            winner: None,
            rules,
        }
    }

    /// Whether the game has ended.
    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Number of participants.
    pub fn player_count(&self) -> usize {
        self.participants.len()
    }

    /// The acting participant, if any.
    pub fn acting(&self) -> Option<&Participant> {
        self.participants.get(self.current)
    }

    /// Influence `participant` holds at `location`.
    pub fn influence_at(&self, location: LocationId, participant: usize) -> u32 {
        self.board
            .get(location)
            .map_or(0, |loc| loc.influence_of(participant))
    }

    /// Number of locations where `participant` sits at full capacity.
    pub fn capped_locations(&self, participant: usize) -> usize {
        self.board
            .iter()
            .filter(|loc| loc.influence_of(participant) >= loc.max_influence)
            .count()
    }

    /// Sum of `participant`'s influence across the board.
    pub fn board_influence(&self, participant: usize) -> u32 {
        self.board.iter().map(|loc| loc.influence_of(participant)).sum()
    }

    /// Highest cumulative influence of anyone other than `participant`.
    pub fn best_rival_influence(&self, participant: usize) -> u32 {
        self.participants
            .iter()
            .filter(|p| p.id != participant)
            .map(|p| p.influence)
            .max()
            .unwrap_or(0)
    }

    /// Rounds played so far, counting a round in progress.
    ///
    /// At a round boundary the counter already points at the next round, so
    /// it is reduced by one; a game still in round 1 always reports 1.
    pub fn rounds_played(&self) -> u32 {
        let mid_round = self.current != 0 || self.actions_taken != 0;
        if mid_round || self.round == 1 {
            self.round
        } else {
            self.round - 1
        }
    }
}
