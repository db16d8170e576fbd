//! Aggregate statistics over finished games.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::engine::{Action, ActionKind, Archetype, Topology};
use crate::sim::{GameResult, TraceEntry};

/// Wins out of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WinRate {
    /// Games counted.
    pub games: usize,
    /// Games won.
    pub wins: usize,
    /// `wins / games`, 0 when no games.
    pub rate: f64,
}

impl WinRate {
    fn record(&mut self, won: bool) {
        self.games += 1;
        self.wins += usize::from(won);
    }

    fn finish(&mut self) {
        self.rate = ratio(self.wins, self.games);
    }
}

/// Usage and success of one action kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ActionStats {
    /// Times proposed, including rejected proposals.
    pub used: usize,
    /// Times the action had its intended effect.
    pub succeeded: usize,
    /// Share of all traced actions.
    pub usage_share: f64,
    /// `succeeded / used`.
    pub success_rate: f64,
}

/// Activity at one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationStats {
    /// Location name.
    pub name: String,
    /// Successful claims made here.
    pub claims: usize,
    /// Total influence claimed here.
    pub claim_volume: u64,
    /// Challenges that removed influence here.
    pub challenges: usize,
    /// Games in which at least two participants claimed here.
    pub contested_games: usize,
}

/// Everything [`analyze`] computes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Games analyzed.
    pub games: usize,
    /// Mean rounds per game.
    pub average_rounds: f64,
    /// Games that ended on the action cap.
    pub capped_games: usize,
    /// Win rate by archetype name.
    pub characters: BTreeMap<String, WinRate>,
    /// Usage by action kind name.
    pub actions: BTreeMap<String, ActionStats>,
    /// Per-location activity, indexed by location id.
    pub locations: Vec<LocationStats>,
    /// Win rate by seat (turn-order position).
    pub seats: Vec<WinRate>,
    /// `policies[row][column]`: how often `row` won among games where both
    /// policies were seated.
    pub policies: BTreeMap<String, BTreeMap<String, WinRate>>,
    /// 1 for perfectly even archetype win rates, falling toward 0 as they
    /// spread.
    pub balance_score: f64,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Whether a traced action had its intended effect.
///
/// A claim succeeds if influence increased, a challenge if its cost was paid.
pub fn succeeded(entry: &TraceEntry) -> bool {
    if !entry.applied {
        return false;
    }
    match entry.kind {
        ActionKind::Claim => entry.influence_delta > 0,
        ActionKind::Challenge => entry.gold_delta < 0,
        ActionKind::Move | ActionKind::Rest => true,
    }
}

/// Compute every statistic over `results`.
pub fn analyze(results: &[GameResult]) -> AnalysisReport {
    let mut report = AnalysisReport {
        games: results.len(),
        locations: (0..Topology::len())
            .map(|id| LocationStats {
                name: Topology::name(id).to_string(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };
    if results.is_empty() {
        report.balance_score = 1.0;
        return report;
    }

    let mut characters: FxHashMap<Archetype, WinRate> = FxHashMap::default();
    let mut expected: FxHashMap<Archetype, f64> = FxHashMap::default();
    let mut actions: FxHashMap<ActionKind, ActionStats> = FxHashMap::default();
    let mut traced = 0usize;
    let mut rounds = 0u64;

    for result in results {
        rounds += u64::from(result.rounds);
        report.capped_games += usize::from(result.capped);
        let even = 1.0 / result.player_count().max(1) as f64;

        for p in &result.participants {
            let won = result.winner == Some(p.seat);
            characters.entry(p.character).or_default().record(won);
            *expected.entry(p.character).or_default() += even;

            if report.seats.len() <= p.seat {
                report.seats.resize(p.seat + 1, WinRate::default());
            }
            report.seats[p.seat].record(won);
        }

        let mut claimants: FxHashMap<usize, FxHashSet<usize>> = FxHashMap::default();
        for entry in &result.trace {
            traced += 1;
            let stats = actions.entry(entry.kind).or_default();
            stats.used += 1;
            let ok = succeeded(entry);
            stats.succeeded += usize::from(ok);

            let Some(location) = report.locations.get_mut(entry.location) else {
                continue;
            };
            match entry.action {
                Action::Claim { .. } if ok => {
                    location.claims += 1;
                    location.claim_volume += entry.influence_delta.unsigned_abs();
                    claimants.entry(entry.location).or_default().insert(entry.actor);
                }
                Action::Challenge { .. } if entry.applied && entry.target_influence_delta < 0 => {
                    location.challenges += 1;
                }
                _ => {}
            }
        }
        for (location, who) in claimants {
            if who.len() >= 2 {
                report.locations[location].contested_games += 1;
            }
        }

        tally_policies(&mut report.policies, result);
    }

    report.average_rounds = rounds as f64 / results.len() as f64;

    for seat in &mut report.seats {
        seat.finish();
    }
    for row in report.policies.values_mut() {
        for cell in row.values_mut() {
            cell.finish();
        }
    }

    report.balance_score = balance_score(&characters, &expected);
    report.characters = characters
        .into_iter()
        .map(|(archetype, mut rate)| {
            rate.finish();
            (archetype.name().to_string(), rate)
        })
        .collect();

    report.actions = actions
        .into_iter()
        .map(|(kind, mut stats)| {
            stats.usage_share = ratio(stats.used, traced);
            stats.success_rate = ratio(stats.succeeded, stats.used);
            (kind.name().to_string(), stats)
        })
        .collect();

    report
}

/// Ordered pairs of distinct policies seated in the same game.
fn tally_policies(table: &mut BTreeMap<String, BTreeMap<String, WinRate>>, result: &GameResult) {
    let mut seated: Vec<&str> = result.participants.iter().map(|p| p.policy.as_str()).collect();
    seated.sort_unstable();
    seated.dedup();
    let winner = result.winner_policy();

    for &row in &seated {
        for &column in &seated {
            if row == column {
                continue;
            }
            table
                .entry(row.to_string())
                .or_default()
                .entry(column.to_string())
                .or_default()
                .record(winner == Some(row));
        }
    }
}

/// `1 - rms(rate - expected) / rms(max deviation)`, clamped to `[0, 1]`.
///
/// The expected rate of an archetype is its average even share
/// `1 / player_count` over the games it played, and its largest possible
/// deviation is `max(expected, 1 - expected)`.
fn balance_score(characters: &FxHashMap<Archetype, WinRate>, expected: &FxHashMap<Archetype, f64>) -> f64 {
    let mut deviation = 0.0;
    let mut worst = 0.0;
    let mut counted = 0usize;

    for (archetype, rate) in characters {
        if rate.games == 0 {
            continue;
        }
        let even = expected.get(archetype).copied().unwrap_or(0.0) / rate.games as f64;
        let actual = ratio(rate.wins, rate.games);
        deviation += (actual - even).powi(2);
        worst += even.max(1.0 - even).powi(2);
        counted += 1;
    }
    if counted == 0 || worst == 0.0 {
        return 1.0;
    }
    let n = counted as f64;
    (1.0 - (deviation / n).sqrt() / (worst / n).sqrt()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ParticipantResult, TraceEntry};

    fn entry(round: u32, actor: usize, action: Action, gold: i64, influence: i64, target: i64) -> TraceEntry {
        TraceEntry {
            round,
            actor,
            character: Archetype::Ra,
            kind: action.kind(),
            action,
            location: 1,
            gold_delta: gold,
            influence_delta: influence,
            target_influence_delta: target,
            applied: true,
        }
    }

    fn game(winner: usize, chars: [Archetype; 2], policies: [&str; 2], trace: Vec<TraceEntry>) -> GameResult {
        GameResult {
            seed: 0,
            winner: Some(winner),
            rounds: 10,
            participants: (0..2)
                .map(|seat| ParticipantResult {
                    seat,
                    character: chars[seat],
                    policy: policies[seat].to_string(),
                    total_influence: 0,
                    gold: 0,
                })
                .collect(),
            trace,
            capped: false,
        }
    }

    #[test]
    fn test_empty_results() {
        let report = analyze(&[]);
        assert_eq!(report.games, 0);
        assert_eq!(report.balance_score, 1.0);
        assert_eq!(report.locations.len(), Topology::len());
    }

    #[test]
    fn test_win_rates() {
        let results = vec![
            game(0, [Archetype::Ra, Archetype::Seth], ["greedy", "random"], Vec::new()),
            game(0, [Archetype::Seth, Archetype::Ra], ["greedy", "random"], Vec::new()),
            game(1, [Archetype::Ra, Archetype::Seth], ["random", "greedy"], Vec::new()),
        ];
        let report = analyze(&results);

        assert_eq!(report.characters["Ra"].games, 3);
        assert_eq!(report.characters["Ra"].wins, 1);
        assert_eq!(report.seats[0].wins, 2);
        assert!((report.seats[0].rate - 2.0 / 3.0).abs() < 1e-12);

        let greedy = report.policies["greedy"]["random"];
        assert_eq!((greedy.wins, greedy.games), (3, 3));
        assert_eq!(report.policies["random"]["greedy"].wins, 0);
        assert!((report.average_rounds - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_action_success_and_locations() {
        let mut rejected = entry(1, 0, Action::Claim { amount: 2 }, 0, 0, 0);
        rejected.applied = false;
        let trace = vec![
            entry(1, 0, Action::Claim { amount: 2 }, -2, 2, 0),
            rejected,
            entry(1, 1, Action::Claim { amount: 1 }, -1, 1, 0),
            entry(2, 0, Action::Challenge { target: 1 }, -2, 0, -1),
            entry(2, 1, Action::Rest, 2, 0, 0),
        ];
        let report = analyze(&[game(0, [Archetype::Ra, Archetype::Isis], ["a", "b"], trace)]);

        let claim = report.actions["claim"];
        assert_eq!((claim.used, claim.succeeded), (3, 2));
        assert!((claim.usage_share - 0.6).abs() < 1e-12);
        assert_eq!(report.actions["challenge"].succeeded, 1);

        let thebes = &report.locations[1];
        assert_eq!(thebes.claims, 2);
        assert_eq!(thebes.claim_volume, 3);
        assert_eq!(thebes.challenges, 1);
        assert_eq!(thebes.contested_games, 1);
    }

    #[test]
    fn test_balance_score() {
        let even = vec![
            game(0, [Archetype::Ra, Archetype::Seth], ["a", "b"], Vec::new()),
            game(0, [Archetype::Seth, Archetype::Ra], ["a", "b"], Vec::new()),
        ];
        assert!((analyze(&even).balance_score - 1.0).abs() < 1e-12);

        let lopsided = vec![
            game(0, [Archetype::Ra, Archetype::Seth], ["a", "b"], Vec::new()),
            game(1, [Archetype::Seth, Archetype::Ra], ["a", "b"], Vec::new()),
        ];
        assert!(analyze(&lopsided).balance_score.abs() < 1e-12);
    }
}
