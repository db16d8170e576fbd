//! Board topology.
//!
//! The board is a fixed graph: Karnak sits in the middle and touches every
//! ring location, and each ring location touches its two ring neighbours.
//!
//! ```text
//!            Thebes(1)
//!   Saqqara(6)        Luxor(2)
//!            Karnak(0)
//!   Giza(5)           Abydos(3)
//!            Memphis(4)
//! ```
//!
//! [`Topology`] is pure lookup over static tables; [`Location`] pairs that
//! static identity with the mutable per-participant influence counts that
//! live inside a game state.

use serde::Serialize;

/// Stable location identifier (index into the board).
pub type LocationId = usize;

/// Static description of one location.
#[derive(Debug, Clone, Copy)]
struct LocationSpec {
    name: &'static str,
    adjacent: &'static [LocationId],
}

const LOCATIONS: [LocationSpec; 7] = [
    LocationSpec { name: "Karnak", adjacent: &[1, 2, 3, 4, 5, 6] },
    LocationSpec { name: "Thebes", adjacent: &[0, 2, 6] },
    LocationSpec { name: "Luxor", adjacent: &[0, 1, 3] },
    LocationSpec { name: "Abydos", adjacent: &[0, 2, 4] },
    LocationSpec { name: "Memphis", adjacent: &[0, 3, 5] },
    LocationSpec { name: "Giza", adjacent: &[0, 4, 6] },
    LocationSpec { name: "Saqqara", adjacent: &[0, 5, 1] },
];

/// Read-only view of the adjacency graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct Topology;

impl Topology {
    /// The central shrine, adjacent to every other location.
    pub const CENTER: LocationId = 0;

    /// Ring shrine sacred to Isis.
    pub const ABYDOS: LocationId = 3;

    /// Number of locations on the board.
    pub const fn len() -> usize {
        LOCATIONS.len()
    }

    /// Whether `id` names a location.
    pub const fn contains(id: LocationId) -> bool {
        id < LOCATIONS.len()
    }

    /// Display name of a location, `"?"` for unknown ids.
    pub fn name(id: LocationId) -> &'static str {
        LOCATIONS.get(id).map_or("?", |row| row.name)
    }

    /// Locations adjacent to `id`. Empty for unknown ids.
    pub fn neighbors(id: LocationId) -> &'static [LocationId] {
        LOCATIONS.get(id).map_or(&[], |row| row.adjacent)
    }

    /// Whether two distinct locations share an edge.
    pub fn adjacent(a: LocationId, b: LocationId) -> bool {
        Self::neighbors(a).contains(&b)
    }

    /// Starting location for seat `seat` of `player_count`, spread around the ring.
    pub fn start_location(seat: usize, player_count: usize) -> LocationId {
        let ring = Self::len() - 1;
        1 + (seat * ring) / player_count.max(1)
    }
}

/// A location together with the influence each participant holds there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Stable identifier.
    pub id: LocationId,
    /// Display name.
    pub name: &'static str,
    /// Adjacent locations; never mutated.
    pub adjacent: &'static [LocationId],
    /// Influence per participant, indexed by participant id.
    pub influence: Vec<u32>,
    /// Per-participant capacity.
    pub max_influence: u32,
}

impl Location {
    /// Build the full board for `player_count` participants.
    pub fn board(player_count: usize, max_influence: u32) -> Vec<Location> {
        LOCATIONS
            .iter()
            .enumerate()
            .map(|(id, row)| Location {
                id,
                name: row.name,
                adjacent: row.adjacent,
                influence: vec![0; player_count],
                max_influence,
            })
            .collect()
    }

    /// Influence held by `participant`, zero for unknown participants.
    pub fn influence_of(&self, participant: usize) -> u32 {
        self.influence.get(participant).copied().unwrap_or(0)
    }

    /// Capacity `participant` has left at this location.
    pub fn room_for(&self, participant: usize) -> u32 {
        self.max_influence.saturating_sub(self.influence_of(participant))
    }

    /// Number of participants holding any influence here.
    pub fn holders(&self) -> usize {
        self.influence.iter().filter(|&&v| v > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency_is_symmetric() {
        for a in 0..Topology::len() {
            for &b in Topology::neighbors(a) {
                assert!(Topology::adjacent(b, a), "{a} -> {b} not mirrored");
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_center_touches_everything() {
        for id in 1..Topology::len() {
            assert!(Topology::adjacent(Topology::CENTER, id));
        }
        assert!(!Topology::adjacent(1, 4));
    }

    #[test]
    fn test_start_locations_are_distinct_ring_spots() {
        for n in 2..=4 {
            let starts: Vec<_> = (0..n).map(|s| Topology::start_location(s, n)).collect();
            let mut dedup = starts.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(dedup.len(), n);
            assert!(starts.iter().all(|&l| l != Topology::CENTER && Topology::contains(l)));
        }
    }

    #[test]
    fn test_room_and_holders() {
        let mut board = Location::board(2, 3);
        board[2].influence[1] = 2;
        assert_eq!(board[2].room_for(1), 1);
        assert_eq!(board[2].room_for(0), 3);
        assert_eq!(board[2].holders(), 1);
        assert_eq!(board[2].influence_of(9), 0);
    }
}
