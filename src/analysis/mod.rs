//! Post-hoc analysis of finished games.
//!
//! Everything here works on an immutable slice of [`GameResult`]s that the
//! batch harness has already finished producing.
//!
//! - [`stats`]: win rates, action usage, location activity, balance score
//! - [`equilibrium`]: empirical payoff matrix over action kinds and its
//!   mixed-strategy equilibrium
//!
//! [`GameResult`]: crate::sim::GameResult

pub mod equilibrium;
pub mod stats;

pub use equilibrium::{
    closed_form, fictitious_play, saddle_point, solve, Equilibrium, FictitiousPlayConfig, PayoffMatrix,
    SolveMethod,
};
pub use stats::{analyze, succeeded, ActionStats, AnalysisReport, LocationStats, WinRate};
