//! Many independent games across player counts and lineups.
//!
//! # Overview
//!
//! A [`BatchConfig`] expands into a list of configurations (one lineup of
//! policy names per configuration). The game budget is split evenly across
//! valid configurations and every game runs as its own job:
//!
//! ```text
//! BatchConfig ──expand──▶ [config] ──split──▶ [job] ──par_iter──▶ [GameResult]
//!                            │                                        │
//!                            └── bad lineup ──▶ BatchError      summarize
//! ```
//!
//! Jobs share nothing but the read-only configuration. Results are
//! collected by the parallel iterator in job order, so a batch with a fixed
//! seed is reproducible regardless of thread count.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::policy::{Policy, PolicyKind};
use crate::sim::config::{BatchConfig, ConfigError};
use crate::sim::runner::{run_with_policies, GameResult};

/// Aggregate over the games of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    /// Human-readable lineup, e.g. `"greedy vs mcts"`.
    pub label: String,
    /// Participants per game.
    pub player_count: usize,
    /// Policy names before seat rotation.
    pub lineup: Vec<String>,
    /// Games played.
    pub games: usize,
    /// Wins per policy name.
    pub wins_by_policy: BTreeMap<String, usize>,
    /// Wins per seat.
    pub wins_by_seat: Vec<usize>,
    /// Mean rounds per game.
    pub mean_rounds: f64,
    /// Games that hit the action cap.
    pub capped: usize,
}

/// A configuration that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Lineup label as configured.
    pub label: String,
    /// Why it was skipped.
    pub message: String,
}

/// Output of [`run_batch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Games actually played.
    pub total_games: usize,
    /// One entry per valid configuration.
    pub summaries: Vec<ConfigSummary>,
    /// Skipped configurations.
    pub errors: Vec<BatchError>,
    /// Every game result, grouped by configuration.
    pub results: Vec<GameResult>,
}

/// A validated lineup.
#[derive(Debug, Clone)]
struct Matchup {
    label: String,
    names: Vec<String>,
    kinds: Vec<PolicyKind>,
}

/// One game to play.
#[derive(Debug, Clone, Copy)]
struct Job {
    config: usize,
    game: usize,
    global: usize,
}

/// Run `config` without progress reporting.
pub fn run_batch(config: &BatchConfig) -> Result<BatchResult, ConfigError> {
    run_batch_with_progress(config, |_, _, _| {})
}

/// Run `config`, calling `progress(completed, total, label)` after every
/// finished game.
///
/// Fails only when the batch as a whole is invalid; a malformed lineup is
/// recorded in [`BatchResult::errors`] and the rest of the batch proceeds.
pub fn run_batch_with_progress<F>(config: &BatchConfig, progress: F) -> Result<BatchResult, ConfigError>
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    config.validate()?;

    let (matchups, errors) = expand(config);
    for error in &errors {
        warn!(label = %error.label, message = %error.message, "skipping configuration");
    }

    let jobs = schedule(config.total_games, matchups.len());
    let total = jobs.len();
    info!(
        games = total,
        configurations = matchups.len(),
        skipped = errors.len(),
        "starting batch"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency.unwrap_or(0))
        .build()
        .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;

    let completed = AtomicUsize::new(0);
    let results: Vec<GameResult> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let matchup = &matchups[job.config];
                let result = play(config, matchup, job);
                let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
                progress(count, total, &matchup.label);
                result
            })
            .collect()
    });

    let summaries = summarize(&matchups, &jobs, &results);
    info!(games = results.len(), "batch finished");

    Ok(BatchResult {
        total_games: results.len(),
        summaries,
        errors,
        results,
    })
}

/// Lineups to play, and the ones rejected.
fn expand(config: &BatchConfig) -> (Vec<Matchup>, Vec<BatchError>) {
    let lineups: Vec<Vec<String>> = if config.matchups.is_empty() {
        config
            .player_counts
            .iter()
            .flat_map(|&count| combinations_with_replacement(&config.policies, count))
            .collect()
    } else {
        config.matchups.clone()
    };

    let mut matchups = Vec::new();
    let mut errors = Vec::new();
    for names in lineups {
        let label = names.join(" vs ");
        if !config.player_counts.contains(&names.len()) {
            errors.push(BatchError {
                message: format!(
                    "lineup has {} seats but tested player counts are {:?}",
                    names.len(),
                    config.player_counts
                ),
                label,
            });
            continue;
        }
        match names.iter().map(|n| n.parse::<PolicyKind>()).collect::<Result<Vec<_>, _>>() {
            Ok(kinds) => matchups.push(Matchup {
                label,
                names: kinds.iter().map(|k| k.name().to_string()).collect(),
                kinds,
            }),
            Err(e) => errors.push(BatchError {
                label,
                message: e.to_string(),
            }),
        }
    }
    (matchups, errors)
}

/// Every multiset of `k` items from `pool`, in lexicographic index order.
fn combinations_with_replacement(pool: &[String], k: usize) -> Vec<Vec<String>> {
    if pool.is_empty() || k == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut idx = vec![0usize; k];
    loop {
        out.push(idx.iter().map(|&i| pool[i].clone()).collect());

        let Some(pos) = (0..k).rev().find(|&p| idx[p] + 1 < pool.len()) else {
            break;
        };
        let next = idx[pos] + 1;
        for slot in &mut idx[pos..] {
            *slot = next;
        }
    }
    out
}

/// Split `total` games over `configs` configurations, remainder to the
/// first ones.
fn schedule(total: usize, configs: usize) -> Vec<Job> {
    if configs == 0 {
        return Vec::new();
    }
    let base = total / configs;
    let extra = total % configs;

    let mut jobs = Vec::with_capacity(total);
    for config in 0..configs {
        let games = base + usize::from(config < extra);
        for game in 0..games {
            jobs.push(Job {
                config,
                game,
                global: jobs.len(),
            });
        }
    }
    jobs
}

/// Play one job. Seat `s` gets lineup entry `(s + game) % n`.
fn play(config: &BatchConfig, matchup: &Matchup, job: &Job) -> GameResult {
    let n = matchup.kinds.len();
    let policies: Vec<Box<dyn Policy>> = (0..n)
        .map(|seat| matchup.kinds[(seat + job.game) % n].build(config.difficulty))
        .collect();
    let seed = config.seed.wrapping_add(job.global as u64);
    run_with_policies(config.rules, &policies, seed, config.max_actions)
}

fn summarize(matchups: &[Matchup], jobs: &[Job], results: &[GameResult]) -> Vec<ConfigSummary> {
    let mut summaries: Vec<ConfigSummary> = matchups
        .iter()
        .map(|m| ConfigSummary {
            label: m.label.clone(),
            player_count: m.kinds.len(),
            lineup: m.names.clone(),
            games: 0,
            wins_by_policy: m.names.iter().map(|n| (n.clone(), 0)).collect(),
            wins_by_seat: vec![0; m.kinds.len()],
            mean_rounds: 0.0,
            capped: 0,
        })
        .collect();

    for (job, result) in jobs.iter().zip(results) {
        let summary = &mut summaries[job.config];
        summary.games += 1;
        summary.mean_rounds += f64::from(result.rounds);
        summary.capped += usize::from(result.capped);
        if let Some(seat) = result.winner {
            if let Some(count) = summary.wins_by_seat.get_mut(seat) {
                *count += 1;
            }
        }
        if let Some(policy) = result.winner_policy() {
            *summary.wins_by_policy.entry(policy.to_string()).or_insert(0) += 1;
        }
    }

    for summary in &mut summaries {
        if summary.games > 0 {
            summary.mean_rounds /= summary.games as f64;
        }
    }
    summaries
}
