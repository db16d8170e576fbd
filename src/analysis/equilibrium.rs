//! Empirical payoff matrices over action kinds and their mixed equilibria.
//!
//! # Overview
//!
//! Action selection is treated as a repeated zero-sum game between the row
//! and column player. Payoffs come from recorded games: every pair of
//! applied actions by different participants in the same round is one
//! sample, scored as the difference of their influence swings:
//!
//! ```text
//! swing(e)     = influence_delta(e) - target_influence_delta(e)
//! payoff(a, b) = mean over samples of swing(a) - swing(b)
//! ```
//!
//! [`solve`] then returns a mixed strategy for each side:
//!
//! 1. a pure saddle point, when the maximin equals the minimax
//! 2. the closed-form solution for a 2x2 matrix
//! 3. fictitious play for everything else
//!
//! The row player maximizes, the column player minimizes.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::ActionKind;
use crate::sim::{GameResult, TraceEntry};

/// Values closer than this are treated as equal.
const EPSILON: f64 = 1e-12;

/// Payoffs to the row player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoffMatrix {
    /// Row labels.
    pub rows: Vec<String>,
    /// Column labels.
    pub columns: Vec<String>,
    /// `values[i][j]`: payoff to the row player.
    pub values: Vec<Vec<f64>>,
    /// Samples behind each cell. All zero for a hand-built matrix.
    pub samples: Vec<Vec<usize>>,
}

impl PayoffMatrix {
    /// Matrix from raw values with index labels.
    pub fn from_values(values: Vec<Vec<f64>>) -> Self {
        let rows = (0..values.len()).map(|i| i.to_string()).collect();
        let width = values.first().map_or(0, Vec::len);
        let columns = (0..width).map(|j| j.to_string()).collect();
        let samples = values.iter().map(|row| vec![0; row.len()]).collect();
        Self {
            rows,
            columns,
            values,
            samples,
        }
    }

    /// Empirical matrix over the action kinds seen in `results`.
    ///
    /// Rows and columns are the same set of kinds, in [`ActionKind`] order.
    /// Cells without samples are 0.
    pub fn from_results(results: &[GameResult]) -> Self {
        let kinds: Vec<ActionKind> = results
            .iter()
            .flat_map(|r| r.trace.iter())
            .filter(|e| e.applied)
            .map(|e| e.kind)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: FxHashMap<ActionKind, usize> = kinds.iter().enumerate().map(|(i, &k)| (k, i)).collect();

        let n = kinds.len();
        let mut sums = vec![vec![0.0; n]; n];
        let mut samples = vec![vec![0usize; n]; n];

        for result in results {
            let mut by_round: FxHashMap<u32, Vec<&TraceEntry>> = FxHashMap::default();
            for entry in result.trace.iter().filter(|e| e.applied) {
                by_round.entry(entry.round).or_default().push(entry);
            }
            for entries in by_round.values() {
                for a in entries {
                    for b in entries {
                        if a.actor == b.actor {
                            continue;
                        }
                        let (i, j) = (index[&a.kind], index[&b.kind]);
                        sums[i][j] += swing(a) - swing(b);
                        samples[i][j] += 1;
                    }
                }
            }
        }

        let values = sums
            .iter()
            .zip(&samples)
            .map(|(row, counts)| {
                row.iter()
                    .zip(counts)
                    .map(|(&sum, &count)| if count == 0 { 0.0 } else { sum / count as f64 })
                    .collect()
            })
            .collect();

        let labels: Vec<String> = kinds.iter().map(|k| k.name().to_string()).collect();
        Self {
            rows: labels.clone(),
            columns: labels,
            values,
            samples,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.values.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// Expected payoff of mixed strategies `row` and `column`.
    pub fn expected_value(&self, row: &[f64], column: &[f64]) -> f64 {
        self.values
            .iter()
            .zip(row)
            .map(|(cells, &p)| p * cells.iter().zip(column).map(|(&v, &q)| v * q).sum::<f64>())
            .sum()
    }
}

fn swing(entry: &TraceEntry) -> f64 {
    (entry.influence_delta - entry.target_influence_delta) as f64
}

/// How an equilibrium was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    /// Pure-strategy saddle point.
    SaddlePoint,
    /// 2x2 closed form.
    ClosedForm,
    /// Fictitious play.
    FictitiousPlay,
}

/// Mixed strategies for both sides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equilibrium {
    /// Row player's mixed strategy.
    pub row_strategy: Vec<f64>,
    /// Column player's mixed strategy.
    pub column_strategy: Vec<f64>,
    /// Game value to the row player.
    pub value: f64,
    /// How it was computed.
    pub method: SolveMethod,
    /// Fictitious-play iterations, 0 for the exact methods.
    pub iterations: u64,
    /// Whether the tolerance was met.
    pub converged: bool,
}

/// Configuration for fictitious play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FictitiousPlayConfig {
    /// Stop once the largest per-entry strategy change between two
    /// snapshots falls below this.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: u64,
    /// Iterations between strategy snapshots.
    pub check_interval: u64,
}

impl Default for FictitiousPlayConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 200_000,
            check_interval: 1000,
        }
    }
}

impl FictitiousPlayConfig {
    /// Builder method: set the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method: set the iteration cap.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = iterations;
        self
    }
}

/// Equilibrium of `matrix`, or `None` for an empty or ragged matrix.
pub fn solve(matrix: &PayoffMatrix, config: &FictitiousPlayConfig) -> Option<Equilibrium> {
    let (m, n) = (matrix.height(), matrix.width());
    if m == 0 || n == 0 || matrix.values.iter().any(|row| row.len() != n) {
        return None;
    }
    if let Some(eq) = saddle_point(matrix) {
        return Some(eq);
    }
    if m == 2 && n == 2 {
        if let Some(eq) = closed_form(matrix) {
            return Some(eq);
        }
    }
    Some(fictitious_play(matrix, config))
}

/// Pure equilibrium when the row maximin equals the column minimax.
pub fn saddle_point(matrix: &PayoffMatrix) -> Option<Equilibrium> {
    let a = &matrix.values;
    let (m, n) = (matrix.height(), matrix.width());

    let (row, maximin) = (0..m)
        .map(|i| (i, a[i].iter().copied().fold(f64::INFINITY, f64::min)))
        .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });
    let (column, minimax) = (0..n)
        .map(|j| (j, (0..m).map(|i| a[i][j]).fold(f64::NEG_INFINITY, f64::max)))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });

    if (maximin - minimax).abs() > EPSILON {
        return None;
    }
    Some(Equilibrium {
        row_strategy: one_hot(m, row),
        column_strategy: one_hot(n, column),
        value: a[row][column],
        method: SolveMethod::SaddlePoint,
        iterations: 0,
        converged: true,
    })
}

/// Analytic solution of a 2x2 game without a saddle point.
///
/// ```text
/// | a b |      p = (d - c) / D      q = (d - b) / D
/// | c d |      v = (ad - bc) / D    D = a - b - c + d
/// ```
///
/// `p` is the row player's weight on row 0 and `q` the column player's on
/// column 0. Returns `None` for a degenerate matrix.
pub fn closed_form(matrix: &PayoffMatrix) -> Option<Equilibrium> {
    if matrix.height() != 2 || matrix.width() != 2 {
        return None;
    }
    let [a, b] = [matrix.values[0][0], matrix.values[0][1]];
    let [c, d] = [matrix.values[1][0], matrix.values[1][1]];
    let denom = a - b - c + d;
    if denom.abs() < EPSILON {
        return None;
    }
    let p = (d - c) / denom;
    let q = (d - b) / denom;
    if !(0.0..=1.0).contains(&p) || !(0.0..=1.0).contains(&q) {
        return None;
    }
    Some(Equilibrium {
        row_strategy: vec![p, 1.0 - p],
        column_strategy: vec![q, 1.0 - q],
        value: (a * d - b * c) / denom,
        method: SolveMethod::ClosedForm,
        iterations: 0,
        converged: true,
    })
}

/// Fictitious play from a start on the first row and column.
///
/// Each iteration the row side best-responds to the column side's
/// empirical mixture, then the column side best-responds to the updated row
/// mixture, lowest index first on ties. Iteration `t` adds weight `t` to the
/// chosen row and column. Every `check_interval` iterations the empirical
/// strategies are compared with the previous snapshot; the run converges
/// once that change and the exploitability gap are both below `tolerance`.
pub fn fictitious_play(matrix: &PayoffMatrix, config: &FictitiousPlayConfig) -> Equilibrium {
    let a = &matrix.values;
    let (m, n) = (matrix.height(), matrix.width());
    let interval = config.check_interval.max(1);

    let mut row_counts = one_hot(m, 0);
    let mut column_counts = one_hot(n, 0);
    let mut snapshot = (normalize(&row_counts), normalize(&column_counts));
    let mut iterations = 0;
    let mut converged = false;

    for t in 1..=config.max_iterations {
        let weight = t as f64;

        let column_mix = normalize(&column_counts);
        let best_row = best_row_response(a, &column_mix).0;
        row_counts[best_row] += weight;

        let row_mix = normalize(&row_counts);
        let best_column = best_column_response(a, &row_mix).0;
        column_counts[best_column] += weight;
        iterations = t;

        if t % interval == 0 {
            let current = (normalize(&row_counts), normalize(&column_counts));
            let change = max_change(&current.0, &snapshot.0).max(max_change(&current.1, &snapshot.1));
            let gap = exploitability(a, &current.0, &current.1);
            snapshot = current;
            if change < config.tolerance && gap < config.tolerance {
                converged = true;
                break;
            }
        }
    }

    let row_strategy = normalize(&row_counts);
    let column_strategy = normalize(&column_counts);
    let value = matrix.expected_value(&row_strategy, &column_strategy);
    debug!(iterations, converged, value, "fictitious play finished");

    Equilibrium {
        row_strategy,
        column_strategy,
        value,
        method: SolveMethod::FictitiousPlay,
        iterations,
        converged,
    }
}

/// Best row against `column_mix` and its value.
fn best_row_response(a: &[Vec<f64>], column_mix: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, cells) in a.iter().enumerate() {
        let value: f64 = cells.iter().zip(column_mix).map(|(&v, &q)| v * q).sum();
        if value > best.1 {
            best = (i, value);
        }
    }
    best
}

/// Best column against `row_mix` and its value.
fn best_column_response(a: &[Vec<f64>], row_mix: &[f64]) -> (usize, f64) {
    let width = a.first().map_or(0, Vec::len);
    let mut best = (0, f64::INFINITY);
    for j in 0..width {
        let value: f64 = a.iter().zip(row_mix).map(|(cells, &p)| cells[j] * p).sum();
        if value < best.1 {
            best = (j, value);
        }
    }
    best
}

/// Row best-response value minus column best-response value. The game
/// value lies between the two, so a small gap pins both strategies near it.
fn exploitability(a: &[Vec<f64>], row_mix: &[f64], column_mix: &[f64]) -> f64 {
    best_row_response(a, column_mix).1 - best_column_response(a, row_mix).1
}

fn one_hot(len: usize, index: usize) -> Vec<f64> {
    let mut v = vec![0.0; len];
    if let Some(slot) = v.get_mut(index) {
        *slot = 1.0;
    }
    v
}

fn normalize(counts: &[f64]) -> Vec<f64> {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return vec![1.0 / counts.len() as f64; counts.len()];
    }
    counts.iter().map(|c| c / total).collect()
}

fn max_change(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Action, Archetype};
    use crate::sim::{GameResult, ParticipantResult};

    #[test]
    fn test_closed_form() {
        let matrix = PayoffMatrix::from_values(vec![vec![2.0, -1.0], vec![-1.0, 1.0]]);
        let eq = solve(&matrix, &FictitiousPlayConfig::default()).unwrap();
        assert_eq!(eq.method, SolveMethod::ClosedForm);
        assert!((eq.row_strategy[0] - 0.4).abs() < 1e-12);
        assert!((eq.column_strategy[0] - 0.4).abs() < 1e-12);
        assert!((eq.value - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_saddle_point() {
        let matrix = PayoffMatrix::from_values(vec![vec![3.0, 1.0], vec![4.0, 2.0]]);
        let eq = solve(&matrix, &FictitiousPlayConfig::default()).unwrap();
        assert_eq!(eq.method, SolveMethod::SaddlePoint);
        assert_eq!(eq.row_strategy, vec![0.0, 1.0]);
        assert_eq!(eq.column_strategy, vec![0.0, 1.0]);
        assert_eq!(eq.value, 2.0);
    }

    #[test]
    fn test_fictitious_play_rock_paper_scissors() {
        let matrix = PayoffMatrix::from_values(vec![
            vec![0.0, -1.0, 1.0],
            vec![1.0, 0.0, -1.0],
            vec![-1.0, 1.0, 0.0],
        ]);
        let eq = solve(&matrix, &FictitiousPlayConfig::default()).unwrap();
        assert_eq!(eq.method, SolveMethod::FictitiousPlay);
        assert!(eq.converged);
        for p in eq.row_strategy.iter().chain(&eq.column_strategy) {
            assert!((p - 1.0 / 3.0).abs() < 0.01);
        }
        assert!(eq.value.abs() < 0.01);
    }

    #[test]
    fn test_fictitious_play_lands_within_tolerance() {
        let matrices = [
            vec![vec![2.0, -1.0], vec![-1.0, 1.0]],
            vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
            vec![vec![3.0, 0.0], vec![0.0, 1.0]],
        ];
        for values in matrices {
            let matrix = PayoffMatrix::from_values(values);
            let exact = closed_form(&matrix).unwrap();
            for tolerance in [1e-2, 1e-3, 1e-4] {
                let config = FictitiousPlayConfig::default().with_tolerance(tolerance);
                let approx = fictitious_play(&matrix, &config);
                assert!(approx.converged, "{:?} at {tolerance}", matrix.values);
                let strategies = approx.row_strategy.iter().zip(&exact.row_strategy);
                let columns = approx.column_strategy.iter().zip(&exact.column_strategy);
                for (a, b) in strategies.chain(columns) {
                    assert!((a - b).abs() < tolerance, "{:?} at {tolerance}: {a} vs {b}", matrix.values);
                }
                assert!((approx.value - exact.value).abs() < tolerance);
            }
        }
    }

    #[test]
    fn test_fictitious_play_reports_cap() {
        let matrix = PayoffMatrix::from_values(vec![vec![2.0, -1.0], vec![-1.0, 1.0]]);
        let config = FictitiousPlayConfig::default().with_max_iterations(500);
        let eq = fictitious_play(&matrix, &config);
        assert!(!eq.converged);
        assert_eq!(eq.iterations, 500);
    }

    #[test]
    fn test_empty_matrix() {
        assert!(solve(&PayoffMatrix::from_values(Vec::new()), &FictitiousPlayConfig::default()).is_none());
    }

    #[test]
    fn test_from_results_pairs_actors_within_round() {
        let entry = |round, actor, action: Action, influence, target| TraceEntry {
            round,
            actor,
            character: Archetype::Ra,
            kind: action.kind(),
            action,
            location: 1,
            gold_delta: 0,
            influence_delta: influence,
            target_influence_delta: target,
            applied: true,
        };
        let result = GameResult {
            seed: 0,
            winner: Some(0),
            rounds: 2,
            participants: (0..2)
                .map(|seat| ParticipantResult {
                    seat,
                    character: Archetype::Ra,
                    policy: "x".into(),
                    total_influence: 0,
                    gold: 0,
                })
                .collect(),
            trace: vec![
                entry(1, 0, Action::Claim { amount: 2 }, 2, 0),
                entry(1, 1, Action::Challenge { target: 0 }, 0, -1),
                entry(2, 0, Action::Rest, 0, 0),
            ],
            capped: false,
        };
        let matrix = PayoffMatrix::from_results(&[result]);
        assert_eq!(matrix.rows, vec!["claim", "challenge", "rest"]);
        // claim swing 2 vs challenge swing 1
        assert_eq!(matrix.values[0][1], 1.0);
        assert_eq!(matrix.values[1][0], -1.0);
        assert_eq!(matrix.samples[0][1], 1);
        // the lone round-2 rest has no partner
        assert_eq!(matrix.samples[2].iter().sum::<usize>(), 0);
    }
}
