//! Actions a participant can take.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::board::{LocationId, Topology};

/// A fully specified action, carrying only the fields its kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move to a location.
    Move {
        /// Destination.
        to: LocationId,
    },
    /// Spend gold to place influence at the current location.
    Claim {
        /// Requested influence; clamped by gold and remaining capacity.
        amount: u32,
    },
    /// Knock one influence off another participant.
    Challenge {
        /// Target participant index.
        target: usize,
    },
    /// Collect gold.
    Rest,
}

/// Discriminant of [`Action`], used for statistics and payoff matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    /// [`Action::Move`]
    Move,
    /// [`Action::Claim`]
    Claim,
    /// [`Action::Challenge`]
    Challenge,
    /// [`Action::Rest`]
    Rest,
}

impl Action {
    /// Kind of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. } => ActionKind::Move,
            Action::Claim { .. } => ActionKind::Claim,
            Action::Challenge { .. } => ActionKind::Challenge,
            Action::Rest => ActionKind::Rest,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move { to } => write!(f, "Move({})", Topology::name(*to)),
            Action::Claim { amount } => write!(f, "Claim({amount})"),
            Action::Challenge { target } => write!(f, "Challenge(P{target})"),
            Action::Rest => write!(f, "Rest"),
        }
    }
}

impl ActionKind {
    /// All kinds in declaration order.
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Move,
        ActionKind::Claim,
        ActionKind::Challenge,
        ActionKind::Rest,
    ];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::Claim => "claim",
            ActionKind::Challenge => "challenge",
            ActionKind::Rest => "rest",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
