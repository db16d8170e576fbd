//! The transition function and legality queries.
//!
//! Every action goes through two steps: [`plan`] validates it against a
//! read-only state and works out its exact effect, and [`commit`] writes
//! that effect. `plan` returning `None` is the single definition of
//! "illegal", shared by [`apply`], [`is_legal`] and [`legal_actions`].

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::action::Action;
use crate::engine::archetype::Archetype;
use crate::engine::board::{Location, LocationId, Topology};
use crate::engine::rules::RuleSet;
use crate::engine::state::{GameState, Participant, Phase};

/// Smallest supported participant count.
pub const MIN_PLAYERS: usize = 2;

/// Largest supported participant count.
pub const MAX_PLAYERS: usize = 4;

/// Fully worked-out effect of a legal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Move { to: LocationId, cost: u32 },
    Claim { location: LocationId, amount: u32 },
    Challenge { target: usize, location: LocationId, cost: u32 },
    Rest { gold: u32 },
}

/// Deal archetypes and place participants on a `Setup` state.
///
/// Archetypes are shuffled with `rng`, so the deal is reproducible from a
/// seed. Returns the state unchanged when it is not in `Setup`, already has
/// participants, or `player_count` is outside `2..=4`.
pub fn create_players<R: Rng + ?Sized>(
    state: &GameState,
    player_count: usize,
    rng: &mut R,
) -> GameState {
    if state.phase != Phase::Setup
        || !state.participants.is_empty()
        || !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count)
    {
        return state.clone();
    }

    let mut deck = Archetype::ALL;
    deck.shuffle(rng);

    let mut next = state.clone();
    next.participants = deck
        .iter()
        .take(player_count)
        .enumerate()
        .map(|(seat, &archetype)| Participant {
            id: seat,
            archetype,
            location: Topology::start_location(seat, player_count),
            gold: state.rules.starting_gold,
            influence: 0,
            policy_controlled: true,
        })
        .collect();
    next.board = Location::board(player_count, state.rules.max_influence);
    next
}

/// Move a dealt `Setup` state into play.
pub fn begin(state: &GameState) -> GameState {
    if state.phase != Phase::Setup || state.participants.len() < MIN_PLAYERS {
        return state.clone();
    }
    let mut next = state.clone();
    next.phase = Phase::InTurn;
    next.current = 0;
    next.round = 1;
    next.actions_taken = 0;
    next
}

/// Build, deal and begin a game in one call.
pub fn new_game<R: Rng + ?Sized>(rules: RuleSet, player_count: usize, rng: &mut R) -> GameState {
    let setup = GameState::setup(rules);
    begin(&create_players(&setup, player_count, rng))
}

/// Apply one action.
///
/// Pure and total: an illegal action (wrong phase, not enough gold, bad
/// target, nothing to claim) returns a state equal to the input.
pub fn apply(state: &GameState, action: &Action) -> GameState {
    let Some(resolution) = plan(state, action) else {
        return state.clone();
    };

    let mut next = state.clone();
    commit(&mut next, resolution);
    next.pending = None;

    if let Some(winner) = check_terminal(&next) {
        finish(&mut next, winner);
        return next;
    }

    next.actions_taken += 1;
    if next.actions_taken >= next.rules.actions_per_turn {
        end_turn(&mut next);
    }
    next
}

/// Whether `action` would change the state.
pub fn is_legal(state: &GameState, action: &Action) -> bool {
    plan(state, action).is_some()
}

/// Every legal action for the acting participant.
///
/// Claims are listed once per legal amount. Empty when the game is not in
/// play.
pub fn legal_actions(state: &GameState) -> Vec<Action> {
    if state.phase != Phase::InTurn {
        return Vec::new();
    }
    let Some(actor) = state.acting() else {
        return Vec::new();
    };

    let mut actions = Vec::new();

    for to in 0..state.board.len() {
        let action = Action::Move { to };
        if is_legal(state, &action) {
            actions.push(action);
        }
    }

    if let Some(Resolution::Claim { amount, .. }) = plan(state, &Action::Claim { amount: u32::MAX }) {
        actions.extend((1..=amount).map(|amount| Action::Claim { amount }));
    }

    for target in 0..state.participants.len() {
        if target == actor.id {
            continue;
        }
        let action = Action::Challenge { target };
        if is_legal(state, &action) {
            actions.push(action);
        }
    }

    actions.push(Action::Rest);
    actions
}

/// Winner of the game as it stands, if any.
///
/// Instant victories are checked in seat order: reaching the influence
/// threshold, or holding full capacity at enough locations. After the round
/// limit has passed, the tiebreak leader wins. Once a winner is recorded it
/// is returned unchanged.
pub fn check_terminal(state: &GameState) -> Option<usize> {
    if let Some(winner) = state.winner {
        return Some(winner);
    }
    if state.participants.is_empty() {
        return None;
    }

    let rules = &state.rules;
    let instant = state.participants.iter().find(|p| {
        p.influence >= rules.influence_to_win
            || state.capped_locations(p.id) >= rules.locations_to_win
    });
    if let Some(p) = instant {
        return Some(p.id);
    }

    if state.round > rules.round_limit {
        return tiebreak_leader(state);
    }
    None
}

/// Participant with the most influence, then most gold, then lowest seat.
pub fn tiebreak_leader(state: &GameState) -> Option<usize> {
    state
        .participants
        .iter()
        .max_by(|a, b| {
            a.influence
                .cmp(&b.influence)
                .then(a.gold.cmp(&b.gold))
                .then(b.id.cmp(&a.id))
        })
        .map(|p| p.id)
}

fn plan(state: &GameState, action: &Action) -> Option<Resolution> {
    if state.phase != Phase::InTurn || state.winner.is_some() {
        return None;
    }
    let actor = state.acting()?;
    let ability = actor.archetype.ability();
    let rules = &state.rules;

    match *action {
        Action::Move { to } => {
            if !Topology::contains(to) || to >= state.board.len() || to == actor.location {
                return None;
            }
            let cost = ability.move_cost(rules.move_cost, actor.location, to);
            (actor.gold >= cost).then_some(Resolution::Move { to, cost })
        }
        Action::Claim { amount } => {
            let location = actor.location;
            let room = state.board.get(location)?.room_for(actor.id);
            let amount = amount.min(actor.gold).min(room);
            (amount > 0).then_some(Resolution::Claim { location, amount })
        }
        Action::Challenge { target } => {
            if target == actor.id {
                return None;
            }
            let victim = state.participants.get(target)?;
            let location = victim.location;
            if !ability.can_reach(actor.location, location)
                || state.influence_at(location, target) == 0
            {
                return None;
            }
            let cost = ability.challenge_cost(rules.challenge_cost);
            (actor.gold >= cost).then_some(Resolution::Challenge { target, location, cost })
        }
        Action::Rest => Some(Resolution::Rest { gold: rules.rest_gold }),
    }
}

fn commit(state: &mut GameState, resolution: Resolution) {
    let actor = state.current;
    match resolution {
        Resolution::Move { to, cost } => {
            let mover = &mut state.participants[actor];
            mover.gold -= cost;
            mover.location = to;

            let tribute = state.rules.tribute_gold;
            for other in state.participants.iter_mut().filter(|p| p.id != actor) {
                if other.archetype.ability().tribute_location == Some(to) {
                    other.gold += tribute;
                }
            }
        }
        Resolution::Claim { location, amount } => {
            let claimant = &mut state.participants[actor];
            claimant.gold -= amount;
            claimant.influence += amount;
            state.board[location].influence[actor] += amount;
        }
        Resolution::Challenge { target, location, cost } => {
            state.participants[actor].gold -= cost;
            state.participants[target].influence -= 1;
            state.board[location].influence[target] -= 1;
        }
        Resolution::Rest { gold } => {
            state.participants[actor].gold += gold;
        }
    }
}

fn end_turn(state: &mut GameState) {
    let seats = state.participants.len();
    let round_complete = state.current + 1 >= seats;

    state.actions_taken = 0;
    state.current = (state.current + 1) % seats;

    if round_complete {
        state.round += 1;
        if let Some(winner) = check_terminal(state) {
            finish(state, winner);
        }
    }
}

fn finish(state: &mut GameState, winner: usize) {
    state.winner = Some(winner);
    state.phase = Phase::Terminal;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Two-player game with fixed archetypes and positions.
    fn duel(first: Archetype, second: Archetype) -> GameState {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = new_game(RuleSet::default(), 2, &mut rng);
        state.participants[0].archetype = first;
        state.participants[1].archetype = second;
        state
    }

    #[test]
    fn test_new_game_deals_distinct_archetypes() {
        let mut rng = StdRng::seed_from_u64(99);
        let state = new_game(RuleSet::default(), 4, &mut rng);
        assert_eq!(state.phase, Phase::InTurn);
        let mut dealt: Vec<_> = state.participants.iter().map(|p| p.archetype).collect();
        dealt.sort();
        dealt.dedup();
        assert_eq!(dealt.len(), 4);
        assert!(state.participants.iter().all(|p| p.gold == 3));
    }

    #[test]
    fn test_deal_is_reproducible() {
        let a = new_game(RuleSet::default(), 3, &mut StdRng::seed_from_u64(5));
        let b = new_game(RuleSet::default(), 3, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_player_count_is_noop() {
        let setup = GameState::setup(RuleSet::default());
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(create_players(&setup, 5, &mut rng), setup);
        assert_eq!(create_players(&setup, 1, &mut rng), setup);
        assert_eq!(begin(&setup), setup);
    }

    #[test]
    fn test_setup_rejects_actions() {
        let setup = GameState::setup(RuleSet::default());
        assert_eq!(apply(&setup, &Action::Rest), setup);
        assert!(legal_actions(&setup).is_empty());
    }

    #[test]
    fn test_move_costs() {
        let state = duel(Archetype::Seth, Archetype::Ra);
        // Thebes(1) to Luxor(2) is adjacent
        let next = apply(&state, &Action::Move { to: 2 });
        assert_eq!(next.participants[0].location, 2);
        assert_eq!(next.participants[0].gold, 3);

        // Thebes(1) to Abydos(3) costs 1
        let next = apply(&state, &Action::Move { to: 3 });
        assert_eq!(next.participants[0].gold, 2);

        let mut broke = state.clone();
        broke.participants[0].gold = 0;
        assert_eq!(apply(&broke, &Action::Move { to: 3 }), broke);
        assert_eq!(apply(&state, &Action::Move { to: 1 }), state);
        assert_eq!(apply(&state, &Action::Move { to: 42 }), state);
    }

    #[test]
    fn test_horus_moves_anywhere_free() {
        let state = duel(Archetype::Horus, Archetype::Seth);
        let next = apply(&state, &Action::Move { to: 4 });
        assert_eq!(next.participants[0].location, 4);
        assert_eq!(next.participants[0].gold, 3);
    }

    #[test]
    fn test_ra_collects_tribute_at_karnak() {
        let state = duel(Archetype::Seth, Archetype::Ra);
        let next = apply(&state, &Action::Move { to: Topology::CENTER });
        assert_eq!(next.participants[1].gold, 4);

        // Ra entering Karnak himself earns nothing
        let state = duel(Archetype::Ra, Archetype::Seth);
        let next = apply(&state, &Action::Move { to: Topology::CENTER });
        assert_eq!(next.participants[0].gold, 3);
        assert_eq!(next.participants[1].gold, 3);
    }

    #[test]
    fn test_claim_is_clamped() {
        let state = duel(Archetype::Seth, Archetype::Ra);
        let next = apply(&state, &Action::Claim { amount: 10 });
        assert_eq!(next.participants[0].influence, 3);
        assert_eq!(next.participants[0].gold, 0);
        assert_eq!(next.board[1].influence[0], 3);

        let mut poor = state.clone();
        poor.participants[0].gold = 1;
        let next = apply(&poor, &Action::Claim { amount: 3 });
        assert_eq!(next.participants[0].influence, 1);
        assert_eq!(next.participants[0].gold, 0);
    }

    #[test]
    fn test_claim_nothing_is_noop() {
        let state = duel(Archetype::Seth, Archetype::Ra);
        assert_eq!(apply(&state, &Action::Claim { amount: 0 }), state);

        let mut full = state.clone();
        full.board[1].influence[0] = 3;
        full.participants[0].influence = 3;
        assert_eq!(apply(&full, &Action::Claim { amount: 1 }), full);
    }

    #[test]
    fn test_challenge_requires_position_and_influence() {
        let mut state = duel(Archetype::Ra, Archetype::Isis);
        state.participants[1].location = 1;
        assert_eq!(apply(&state, &Action::Challenge { target: 1 }), state);

        state.board[1].influence[1] = 1;
        state.participants[1].influence = 1;
        let next = apply(&state, &Action::Challenge { target: 1 });
        assert_eq!(next.participants[1].influence, 0);
        assert_eq!(next.board[1].influence[1], 0);
        assert_eq!(next.participants[0].gold, 1);

        assert_eq!(apply(&state, &Action::Challenge { target: 0 }), state);
        assert_eq!(apply(&state, &Action::Challenge { target: 7 }), state);
    }

    #[test]
    fn test_anubis_challenges_adjacent() {
        let mut state = duel(Archetype::Anubis, Archetype::Isis);
        state.participants[1].location = 2;
        state.board[2].influence[1] = 2;
        state.participants[1].influence = 2;
        let next = apply(&state, &Action::Challenge { target: 1 });
        assert_eq!(next.board[2].influence[1], 1);

        let mut far = state.clone();
        far.participants[1].location = 4;
        far.board[2].influence[1] = 0;
        far.board[4].influence[1] = 2;
        assert_eq!(apply(&far, &Action::Challenge { target: 1 }), far);
    }

    #[test]
    fn test_rest_pays_the_same_for_everyone() {
        for archetype in Archetype::ALL {
            let state = duel(archetype, Archetype::Ra);
            assert_eq!(apply(&state, &Action::Rest).participants[0].gold, 5);
        }
    }

    #[test]
    fn test_isis_collects_tribute_at_abydos() {
        let mut state = duel(Archetype::Seth, Archetype::Isis);
        state.participants[0].location = 2;
        let next = apply(&state, &Action::Move { to: Topology::ABYDOS });
        assert_eq!(next.participants[1].gold, 4);
        assert_eq!(next.participants[0].gold, 3);

        let elsewhere = apply(&state, &Action::Move { to: 1 });
        assert_eq!(elsewhere.participants[1].gold, 3);
    }

    #[test]
    fn test_pending_is_cleared() {
        let mut state = duel(Archetype::Seth, Archetype::Ra);
        state.pending = Some(Action::Rest);
        assert_eq!(apply(&state, &Action::Rest).pending, None);
    }

    #[test]
    fn test_turn_passes_after_two_actions() {
        let state = duel(Archetype::Seth, Archetype::Ra);
        let one = apply(&state, &Action::Rest);
        assert_eq!((one.current, one.actions_taken, one.round), (0, 1, 1));
        let two = apply(&one, &Action::Rest);
        assert_eq!((two.current, two.actions_taken, two.round), (1, 0, 1));
        let four = apply(&apply(&two, &Action::Rest), &Action::Rest);
        assert_eq!((four.current, four.actions_taken, four.round), (0, 0, 2));
    }

    #[test]
    fn test_dominance_victory() {
        let mut state = duel(Archetype::Seth, Archetype::Ra);
        state.board[2].influence[0] = 3;
        state.board[3].influence[0] = 3;
        state.board[1].influence[0] = 2;
        state.participants[0].influence = 8;
        let next = apply(&state, &Action::Claim { amount: 1 });
        assert_eq!(next.phase, Phase::Terminal);
        assert_eq!(next.winner, Some(0));
    }

    #[test]
    fn test_tiebreak_order() {
        let mut state = duel(Archetype::Seth, Archetype::Ra);
        assert_eq!(tiebreak_leader(&state), Some(0));
        state.participants[1].gold = 4;
        assert_eq!(tiebreak_leader(&state), Some(1));
        state.participants[0].influence = 1;
        assert_eq!(tiebreak_leader(&state), Some(0));
    }

    #[test]
    fn test_legal_actions_are_all_legal() {
        let state = duel(Archetype::Seth, Archetype::Ra);
        let actions = legal_actions(&state);
        assert!(actions.contains(&Action::Rest));
        assert!(actions.contains(&Action::Claim { amount: 3 }));
        assert!(!actions.contains(&Action::Move { to: 1 }));
        for action in &actions {
            assert_ne!(&apply(&state, action), &state, "{action} should be legal");
        }
    }
}
