//! Rules engine for the territorial-control game.
//!
//! This module owns the authoritative [`GameState`] and the pure transition
//! function [`apply`]. Everything here is synchronous and side-effect free:
//! a state goes in, a new state comes out, and illegal requests come back
//! unchanged.
//!
//! # Overview
//!
//! A game moves through three phases:
//!
//! ```text
//! Setup ──begin()──▶ InTurn ──victory──▶ Terminal (absorbing)
//! ```
//!
//! Within `InTurn` each participant resolves exactly
//! [`RuleSet::actions_per_turn`] actions before control passes to the next
//! seat. Finishing the last seat of the rotation closes the round.
//!
//! # Usage
//!
//! ```
//! use pantheon_sim::engine::{self, Action, RuleSet};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let state = engine::new_game(RuleSet::default(), 3, &mut rng);
//! let next = engine::apply(&state, &Action::Rest);
//! assert_eq!(next.actions_taken, 1);
//! ```
//!
//! # Modules
//!
//! - [`board`]: static adjacency graph of locations
//! - [`archetype`]: character archetypes and their capability rows
//! - [`action`]: the four action kinds
//! - [`rules`]: tunable rule constants
//! - [`state`]: game state snapshot
//! - [`transition`]: `apply`, terminal detection, legality queries

pub mod action;
pub mod archetype;
pub mod board;
pub mod rules;
pub mod state;
pub mod transition;

pub use action::{Action, ActionKind};
pub use archetype::{Ability, Archetype, Reach};
pub use board::{Location, LocationId, Topology};
pub use rules::{RuleSet, RulesError};
pub use state::{GameState, Participant, Phase};
pub use transition::{
    apply, begin, check_terminal, create_players, is_legal, legal_actions, new_game,
    tiebreak_leader,
};
