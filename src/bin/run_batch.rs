//! Batch self-play binary.
//!
//! Usage:
//!   cargo run --release --bin run_batch -- [CONFIG] [RESULTS]
//!
//! Arguments:
//!   CONFIG     Batch configuration JSON (optional, defaults used otherwise)
//!   RESULTS    JSON-lines file the game results are appended to (optional)
//!
//! The analysis report and equilibrium are printed to stdout as JSON. Set
//! `RUST_LOG` to change log verbosity (default `info`).

use std::process::ExitCode;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pantheon_sim::analysis::{analyze, solve, FictitiousPlayConfig, PayoffMatrix};
use pantheon_sim::sim::{run_batch_with_progress, BatchConfig, JsonLinesStore, ResultStore};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config();
    let start = Instant::now();

    let bar = ProgressBar::new(config.total_games as u64);
    bar.set_style(
        ProgressStyle::with_template("{elapsed_precise} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar.enable_steady_tick(Duration::from_millis(200));

    let batch = match run_batch_with_progress(&config, |done, _, label| {
        bar.set_position(done as u64);
        bar.set_message(label.to_string());
    }) {
        Ok(batch) => batch,
        Err(e) => {
            bar.abandon();
            error!(error = %e, "batch configuration rejected");
            return ExitCode::FAILURE;
        }
    };
    bar.finish_and_clear();

    info!(
        games = batch.total_games,
        skipped = batch.errors.len(),
        secs = start.elapsed().as_secs_f64(),
        "batch complete"
    );

    if let Some(path) = std::env::args().nth(2) {
        let store = JsonLinesStore::new(&path);
        match store.save(&batch.results) {
            Ok(()) => info!(path = %path, "results saved"),
            Err(e) => warn!(path = %path, error = %e, "could not save results"),
        }
    }

    let report = analyze(&batch.results);
    let matrix = PayoffMatrix::from_results(&batch.results);
    let equilibrium = solve(&matrix, &FictitiousPlayConfig::default());

    let output = json!({
        "summaries": batch.summaries,
        "errors": batch.errors,
        "report": report,
        "payoff_matrix": matrix,
        "equilibrium": equilibrium,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "could not serialize report");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> BatchConfig {
    let Some(path) = std::env::args().nth(1) else {
        info!("no config given, using defaults");
        return BatchConfig::default();
    };

    match BatchConfig::from_json_file(&path) {
        Ok(config) => {
            info!(path = %path, "loaded config");
            config
        }
        Err(e) => {
            warn!(path = %path, error = %e, "could not load config, using defaults");
            BatchConfig::default()
        }
    }
}
