//! End-to-end batch runs: configuration, persistence and analysis.

#![allow(missing_docs)]

use std::sync::Mutex;

use pantheon_sim::analysis::{analyze, solve, FictitiousPlayConfig, PayoffMatrix};
use pantheon_sim::sim::{
    run_batch, run_batch_with_progress, BatchConfig, ConfigError, JsonLinesStore, MemoryStore, ResultFilter,
    ResultStore,
};

fn heuristic_batch() -> BatchConfig {
    BatchConfig::default()
        .with_total_games(24)
        .with_player_counts(vec![2, 3])
        .with_policies(["greedy", "weighted", "aggressive"])
        .with_seed(100)
        .with_concurrency(4)
}

#[test]
fn malformed_matchup_does_not_stop_batch() {
    let config = BatchConfig::default()
        .with_total_games(6)
        .with_player_counts(vec![2, 4])
        .with_matchup(["greedy", "defensive"])
        .with_matchup(["greedy", "random", "random"])
        .with_matchup(["random", "random", "weighted", "gambler"])
        .with_matchup(["random", "greedy", "weighted", "defensive"])
        .with_seed(9);

    let batch = run_batch(&config).unwrap();
    assert_eq!(batch.errors.len(), 2);
    assert_eq!(batch.summaries.len(), 2);
    assert_eq!(batch.total_games, 6);
    assert_eq!(batch.summaries[0].games, 3);
    assert_eq!(batch.summaries[1].player_count, 4);
    assert!(batch.errors.iter().any(|e| e.message.contains("gambler")));
}

#[test]
fn invalid_batch_is_rejected_up_front() {
    let config = BatchConfig::default().with_total_games(0);
    assert_eq!(run_batch(&config).unwrap_err(), ConfigError::ZeroGames);
}

#[test]
fn seats_rotate_through_lineup() {
    let config = BatchConfig::default()
        .with_total_games(4)
        .with_player_counts(vec![2])
        .with_matchup(["greedy", "random"])
        .with_seed(1);
    let batch = run_batch(&config).unwrap();
    let first_seats: Vec<&str> = batch.results.iter().map(|r| r.participants[0].policy.as_str()).collect();
    assert_eq!(first_seats, vec!["greedy", "random", "greedy", "random"]);
    let seeds: Vec<u64> = batch.results.iter().map(|r| r.seed).collect();
    assert_eq!(seeds, vec![1, 2, 3, 4]);
}

#[test]
fn progress_reaches_total() {
    let seen = Mutex::new(Vec::new());
    let batch = run_batch_with_progress(&heuristic_batch(), |done, total, _| {
        seen.lock().unwrap().push((done, total));
    })
    .unwrap();

    let mut seen = seen.into_inner().unwrap();
    seen.sort_unstable();
    assert_eq!(seen.len(), batch.total_games);
    assert_eq!(seen.last().copied(), Some((24, 24)));
}

#[test]
fn results_round_trip_through_json_lines() {
    let batch = run_batch(&heuristic_batch()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = JsonLinesStore::new(dir.path().join("results.jsonl"));

    store.save(&batch.results[..10]).unwrap();
    store.save(&batch.results[10..]).unwrap();

    let loaded = store.load(&ResultFilter::all()).unwrap();
    assert_eq!(loaded, batch.results);

    let three = store.load(&ResultFilter::all().with_player_count(3)).unwrap();
    assert!(three.iter().all(|r| r.participants.len() == 3));
    assert_eq!(
        three.len(),
        batch.results.iter().filter(|r| r.player_count() == 3).count()
    );
}

#[test]
fn memory_store_matches_file_store() {
    let batch = run_batch(&heuristic_batch()).unwrap();
    let memory = MemoryStore::new();
    memory.save(&batch.results).unwrap();

    let filter = ResultFilter::all().with_policy("aggressive");
    let loaded = memory.load(&filter).unwrap();
    assert!(!loaded.is_empty());
    assert!(loaded.iter().all(|r| r.has_policy("aggressive")));
}

#[test]
fn analysis_over_batch() {
    let batch = run_batch(&heuristic_batch()).unwrap();
    let report = analyze(&batch.results);

    assert_eq!(report.games, 24);
    let wins: usize = report.characters.values().map(|c| c.wins).sum();
    assert_eq!(wins, 24);
    let seat_wins: usize = report.seats.iter().map(|s| s.wins).sum();
    assert_eq!(seat_wins, 24);
    assert!((0.0..=1.0).contains(&report.balance_score));
    assert!(report.average_rounds >= 1.0);
    assert!(report.actions.contains_key("claim"));

    let matrix = PayoffMatrix::from_results(&batch.results);
    assert_eq!(matrix.height(), matrix.width());
    let eq = solve(&matrix, &FictitiousPlayConfig::default()).unwrap();
    let total: f64 = eq.row_strategy.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}
