//! Offline kill-threshold calibration against labeled historical runs.
//!
//! Grid search with a composite objective: every candidate threshold is
//! scored by replaying each labeled run through a fresh scorer and
//! comparing the worst-case rolling freshness against the candidate.
//! Candidates are independent of one another, so the sweep is evaluated in
//! parallel.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::corpus::LabeledRun;
use crate::domain::WatchdogConfig;
use crate::novelty::NoveltyStrategy;
use crate::scorer::FreshnessScorer;

/// Tie-break epsilon for candidate scores.
const SCORE_EPS: f64 = 1e-12;

/// A false kill (terminating a run that would have succeeded) destroys
/// recoverable value, while a missed failure only wastes extra budget, so
/// the two are penalized asymmetrically. Product constants; do not
/// re-derive.
const FALSE_KILL_WEIGHT: f64 = 2.5;
const MISSED_FAILURE_WEIGHT: f64 = 1.0;

/// Objective used to score candidate thresholds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationObjective {
    /// Accuracy with an asymmetric penalty against killing runs that would
    /// have succeeded.
    #[default]
    AvoidKillingWinners,
    /// Plain classification accuracy.
    Accuracy,
}

/// Search-space and replay parameters for one calibration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationParams {
    pub window_size: usize,
    pub min_steps: usize,
    pub objective: CalibrationObjective,
    pub strategy: NoveltyStrategy,

    /// Explicit candidate thresholds; `None` selects the default sweep of
    /// 41 evenly spaced points from 0.10 to 0.50.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<f64>>,

    /// Returned unchanged when the corpus cannot support calibration.
    pub fallback_threshold: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            window_size: 15,
            min_steps: 5,
            objective: CalibrationObjective::default(),
            strategy: NoveltyStrategy::default(),
            thresholds: None,
            fallback_threshold: 0.25,
        }
    }
}

/// Classification counts and composite score for one candidate threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateScore {
    pub threshold: f64,
    pub score: f64,
    /// Predicted zombie, but the run actually succeeded.
    pub false_kills: usize,
    /// Predicted healthy, but the run actually failed.
    pub missed_failures: usize,
    pub correct: usize,
    pub total: usize,
}

/// Full sweep outcome, suitable for artifact persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationReport {
    pub report_id: Uuid,
    pub objective: CalibrationObjective,
    pub strategy: NoveltyStrategy,
    pub window_size: usize,
    pub min_steps: usize,
    pub runs: usize,
    /// Per-candidate statistics in sweep order; empty when calibration
    /// fell back without sweeping.
    pub candidates: Vec<CandidateScore>,
    pub chosen_threshold: f64,
    pub calibrated_at: DateTime<Utc>,
}

fn default_sweep() -> Vec<f64> {
    (0..41).map(|i| 0.10 + i as f64 * 0.01).collect()
}

fn round2(t: f64) -> f64 {
    (t * 100.0).round() / 100.0
}

/// A single-class corpus would reward degenerate thresholds, so
/// calibration requires at least one success and one failure.
fn has_label_diversity(runs: &[LabeledRun]) -> bool {
    runs.iter().any(|r| r.success) && runs.iter().any(|r| !r.success)
}

fn score_candidate(
    threshold: f64,
    runs: &[LabeledRun],
    params: &CalibrationParams,
) -> CandidateScore {
    let mut false_kills = 0usize;
    let mut missed_failures = 0usize;
    let mut correct = 0usize;

    for run in runs {
        let config = WatchdogConfig::new(threshold, params.window_size, params.min_steps);
        let mut scorer = FreshnessScorer::with_strategy(config, params.strategy);
        for action in &run.actions {
            scorer.record(action);
        }

        let worst_freshness = scorer.min_rolling_freshness();
        let predicted_zombie = worst_freshness < threshold;

        match (predicted_zombie, run.success) {
            (true, true) => false_kills += 1,
            (false, false) => missed_failures += 1,
            _ => correct += 1,
        }
    }

    let total = runs.len();
    let denom = total.max(1) as f64;
    let accuracy = correct as f64 / denom;
    let score = match params.objective {
        CalibrationObjective::AvoidKillingWinners => {
            accuracy
                - FALSE_KILL_WEIGHT * (false_kills as f64 / denom)
                - MISSED_FAILURE_WEIGHT * (missed_failures as f64 / denom)
        }
        CalibrationObjective::Accuracy => accuracy,
    };

    CandidateScore {
        threshold,
        score,
        false_kills,
        missed_failures,
        correct,
        total,
    }
}

/// Run the threshold sweep and keep every candidate's statistics.
///
/// The chosen threshold is deterministic for a given corpus and params:
/// strictly highest score wins, and ties within [`SCORE_EPS`] prefer the
/// smaller (more lenient) threshold. A corpus that is empty or lacks both
/// labels yields `fallback_threshold` unchanged.
pub fn calibrate_report(runs: &[LabeledRun], params: &CalibrationParams) -> CalibrationReport {
    if !has_label_diversity(runs) {
        debug!(
            event = "calibrate.degenerate_corpus",
            runs = runs.len(),
            fallback = params.fallback_threshold,
        );
        return CalibrationReport {
            report_id: Uuid::new_v4(),
            objective: params.objective,
            strategy: params.strategy,
            window_size: params.window_size,
            min_steps: params.min_steps,
            runs: runs.len(),
            candidates: Vec::new(),
            chosen_threshold: round2(params.fallback_threshold),
            calibrated_at: Utc::now(),
        };
    }

    let sweep = params.thresholds.clone().unwrap_or_else(default_sweep);

    // Parallel map preserves sweep order, so the selection scan below is
    // deterministic regardless of scheduling.
    let candidates: Vec<CandidateScore> = sweep
        .par_iter()
        .map(|&t| score_candidate(t, runs, params))
        .collect();

    let mut best_threshold = params.fallback_threshold;
    let mut best_score = f64::NEG_INFINITY;
    for candidate in &candidates {
        debug!(
            event = "calibrate.candidate",
            threshold = candidate.threshold,
            score = candidate.score,
            false_kills = candidate.false_kills,
            missed_failures = candidate.missed_failures,
        );
        if candidate.score > best_score + SCORE_EPS
            || ((candidate.score - best_score).abs() <= SCORE_EPS
                && candidate.threshold < best_threshold)
        {
            best_score = candidate.score;
            best_threshold = candidate.threshold;
        }
    }

    CalibrationReport {
        report_id: Uuid::new_v4(),
        objective: params.objective,
        strategy: params.strategy,
        window_size: params.window_size,
        min_steps: params.min_steps,
        runs: runs.len(),
        candidates,
        chosen_threshold: round2(best_threshold),
        calibrated_at: Utc::now(),
    }
}

/// Best kill threshold for the corpus, rounded to two decimal places.
pub fn calibrate(runs: &[LabeledRun], params: &CalibrationParams) -> f64 {
    calibrate_report(runs, params).chosen_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(actions: &[&str], success: bool) -> LabeledRun {
        LabeledRun::new(actions.iter().map(|s| s.to_string()).collect(), success)
    }

    fn repeated(action: &str, n: usize) -> Vec<String> {
        vec![action.to_string(); n]
    }

    fn mixed_corpus() -> Vec<LabeledRun> {
        // Zombie: worst window freshness 1/15.
        let zombie = LabeledRun::new(repeated("go", 30), false);
        // Drifting failure: 13 repeats plus 2 distinct, worst window 3/15 = 0.2.
        let mut drifting_actions = repeated("loop", 13);
        drifting_actions.push("probe".to_string());
        drifting_actions.push("retry".to_string());
        let drifting = LabeledRun::new(drifting_actions, false);
        // Healthy-but-chatty success: 5 distinct signatures over 15 items, 1/3.
        let healthy = run(
            &[
                "a", "a", "a", "b", "b", "b", "c", "c", "c", "d", "d", "d", "e", "e", "e",
            ],
            true,
        );
        vec![zombie, drifting, healthy]
    }

    #[test]
    fn test_calibrate_separates_corpus() {
        // Thresholds in (0.20, 0.33] classify all three runs correctly;
        // the smallest sweep point in that band is 0.21.
        let chosen = calibrate(&mixed_corpus(), &CalibrationParams::default());
        assert_eq!(chosen, 0.21);
    }

    #[test]
    fn test_calibrate_is_deterministic() {
        let corpus = mixed_corpus();
        let params = CalibrationParams::default();
        assert_eq!(calibrate(&corpus, &params), calibrate(&corpus, &params));
    }

    #[test]
    fn test_tie_break_prefers_smaller_threshold() {
        // One clean zombie and one clean success: every sweep point above
        // the zombie's feature scores identically, so the smallest wins.
        let corpus = vec![
            LabeledRun::new(repeated("go", 30), false),
            run(
                &[
                    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o",
                ],
                true,
            ),
        ];
        let chosen = calibrate(&corpus, &CalibrationParams::default());
        assert_eq!(chosen, 0.10);
    }

    #[test]
    fn test_safe_default_on_all_success_corpus() {
        let corpus = vec![run(&["a", "b", "c"], true), run(&["d", "e", "f"], true)];
        let chosen = calibrate(&corpus, &CalibrationParams::default());
        assert_eq!(chosen, 0.25);
    }

    #[test]
    fn test_safe_default_on_empty_corpus() {
        let params = CalibrationParams {
            fallback_threshold: 0.28,
            ..CalibrationParams::default()
        };
        assert_eq!(calibrate(&[], &params), 0.28);
    }

    #[test]
    fn test_explicit_thresholds_are_respected() {
        let params = CalibrationParams {
            thresholds: Some(vec![0.15, 0.35]),
            ..CalibrationParams::default()
        };
        let report = calibrate_report(&mixed_corpus(), &params);
        assert_eq!(report.candidates.len(), 2);
        // 0.15 misses the drifting failure; 0.35 false-kills the success.
        // Accuracy penalized harder for the false kill, so 0.15 wins.
        assert_eq!(report.chosen_threshold, 0.15);
    }

    #[test]
    fn test_accuracy_objective_skips_penalties() {
        let params = CalibrationParams {
            objective: CalibrationObjective::Accuracy,
            thresholds: Some(vec![0.15, 0.35]),
            ..CalibrationParams::default()
        };
        let report = calibrate_report(&mixed_corpus(), &params);
        // Both candidates misclassify one of three runs; accuracy ties at
        // 2/3 and the smaller threshold wins.
        assert_eq!(report.chosen_threshold, 0.15);
        for candidate in &report.candidates {
            assert!((candidate.score - 2.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_default_sweep_shape() {
        let sweep = default_sweep();
        assert_eq!(sweep.len(), 41);
        assert!((sweep[0] - 0.10).abs() < 1e-12);
        assert!((sweep[40] - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_report_carries_sweep_statistics() {
        let report = calibrate_report(&mixed_corpus(), &CalibrationParams::default());
        assert_eq!(report.runs, 3);
        assert_eq!(report.candidates.len(), 41);
        for candidate in &report.candidates {
            assert_eq!(
                candidate.false_kills + candidate.missed_failures + candidate.correct,
                candidate.total
            );
        }
    }
}
