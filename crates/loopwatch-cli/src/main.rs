//! Loopwatch - zombie-loop watchdog CLI
//!
//! The `loopwatch` command scores agent action logs for repetition and
//! tunes the kill threshold from history.
//!
//! ## Commands
//!
//! - `audit`: score an action log and print the watchdog verdict
//! - `calibrate`: fit the kill threshold against a labeled run corpus

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use loopwatch_core::{
    calibrate_report, load_labeled_runs, write_calibration_artifact, CalibrationObjective,
    CalibrationParams, FreshnessScorer, NoveltyStrategy, WatchdogConfig,
};

#[derive(Parser)]
#[command(name = "loopwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Zombie-loop watchdog for autonomous agents", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Discrete action-type signatures (first token)
    Signature,
    /// Free-text token-set similarity
    Text,
}

impl From<StrategyArg> for NoveltyStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Signature => NoveltyStrategy::SignatureUniqueness,
            StrategyArg::Text => NoveltyStrategy::TokenSimilarity,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ObjectiveArg {
    /// Penalize killing runs that would have succeeded
    AvoidKillingWinners,
    /// Plain classification accuracy
    Accuracy,
}

impl From<ObjectiveArg> for CalibrationObjective {
    fn from(arg: ObjectiveArg) -> Self {
        match arg {
            ObjectiveArg::AvoidKillingWinners => CalibrationObjective::AvoidKillingWinners,
            ObjectiveArg::Accuracy => CalibrationObjective::Accuracy,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Audit an action log (one raw action per line)
    Audit {
        /// Path to the action log
        log: PathBuf,

        /// Freshness below this ratio is a kill signal
        #[arg(long, default_value_t = 0.25)]
        kill_threshold: f64,

        /// Trailing items scored per audit
        #[arg(long, default_value_t = 15)]
        window_size: usize,

        /// Minimum items in scope before escalation is allowed
        #[arg(long, default_value_t = 5)]
        min_steps: usize,

        /// Novelty strategy
        #[arg(long, value_enum, default_value = "signature")]
        strategy: StrategyArg,
    },

    /// Calibrate the kill threshold against a labeled corpus (JSON array)
    Calibrate {
        /// Path to the corpus file
        corpus: PathBuf,

        #[arg(long, default_value_t = 15)]
        window_size: usize,

        #[arg(long, default_value_t = 5)]
        min_steps: usize,

        /// Scoring objective for candidate thresholds
        #[arg(long, value_enum, default_value = "avoid-killing-winners")]
        objective: ObjectiveArg,

        /// Novelty strategy used when replaying runs
        #[arg(long, value_enum, default_value = "signature")]
        strategy: StrategyArg,

        /// Threshold to keep when the corpus cannot support calibration
        #[arg(long, default_value_t = 0.25)]
        fallback_threshold: f64,

        /// Directory to write the auditable calibration artifact into
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    loopwatch_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Audit {
            log,
            kill_threshold,
            window_size,
            min_steps,
            strategy,
        } => cmd_audit(
            &log,
            WatchdogConfig::new(kill_threshold, window_size, min_steps),
            strategy.into(),
        ),
        Commands::Calibrate {
            corpus,
            window_size,
            min_steps,
            objective,
            strategy,
            fallback_threshold,
            artifacts_dir,
        } => {
            let params = CalibrationParams {
                window_size,
                min_steps,
                objective: objective.into(),
                strategy: strategy.into(),
                thresholds: None,
                fallback_threshold,
            };
            cmd_calibrate(&corpus, &params, artifacts_dir.as_deref())
        }
    }
}

fn cmd_audit(log: &Path, config: WatchdogConfig, strategy: NoveltyStrategy) -> Result<()> {
    let text = fs::read_to_string(log)
        .with_context(|| format!("failed to read action log {}", log.display()))?;

    let mut scorer = FreshnessScorer::with_strategy(config, strategy);
    for line in text.lines() {
        scorer.record(line);
    }

    let status = scorer.audit();
    info!(
        event = "audit.completed",
        items = scorer.len(),
        freshness = status.freshness,
        recommendation = %status.recommendation,
    );
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn cmd_calibrate(
    corpus: &Path,
    params: &CalibrationParams,
    artifacts_dir: Option<&Path>,
) -> Result<()> {
    let runs = load_labeled_runs(corpus)
        .with_context(|| format!("failed to load labeled corpus {}", corpus.display()))?;

    let report = calibrate_report(&runs, params);
    info!(
        event = "calibrate.completed",
        runs = runs.len(),
        candidates = report.candidates.len(),
        threshold = report.chosen_threshold,
    );

    if let Some(dir) = artifacts_dir {
        let name = corpus
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("calibration");
        let path = write_calibration_artifact(&report, dir, name)
            .context("failed to write calibration artifact")?;
        info!(event = "calibrate.artifact_written", path = %path.display());
    }

    println!("{}", report.chosen_threshold);
    Ok(())
}
