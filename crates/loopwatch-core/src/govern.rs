//! Status governor: maps a freshness ratio and evidence count to a
//! discrete Green/Amber/Red verdict.
//!
//! The governor is a pure function of its inputs; no prior verdict is
//! consulted and nothing is cached between audits.

use serde::{Deserialize, Serialize};

use crate::domain::WatchdogConfig;

/// Width of the Amber band above the kill threshold. Product constant; do
/// not re-derive.
pub const DRIFT_MARGIN: f64 = 0.15;

/// Discrete health state for a running trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Green,
    Amber,
    Red,
}

/// Audit verdict for one scope of a run's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchdogStatus {
    pub status: HealthStatus,
    pub freshness: f64,
    /// Complement of freshness: the share of the scope burned on repeats.
    pub burn_rate: f64,
    pub recommendation: String,
}

impl WatchdogStatus {
    fn new(status: HealthStatus, freshness: f64, recommendation: &str) -> Self {
        Self {
            status,
            freshness,
            burn_rate: 1.0 - freshness,
            recommendation: recommendation.to_string(),
        }
    }
}

/// Evaluate the governor in fixed precedence: evidence gate, then Red,
/// then Amber, then Green.
///
/// With fewer than `min_steps` items in scope there is not enough evidence
/// to flag anything, so the verdict is Green no matter how low the ratio
/// is. Both thresholds are half-open on the low side: a ratio exactly at
/// `kill_threshold` is not Red, and exactly at `kill_threshold +
/// DRIFT_MARGIN` is Green.
pub fn evaluate_status(
    freshness: f64,
    items_in_scope: usize,
    config: &WatchdogConfig,
) -> WatchdogStatus {
    if items_in_scope < config.min_steps {
        return WatchdogStatus::new(HealthStatus::Green, freshness, "Continue");
    }
    if freshness < config.kill_threshold {
        return WatchdogStatus::new(HealthStatus::Red, freshness, "KILL RUN");
    }
    if freshness < config.kill_threshold + DRIFT_MARGIN {
        return WatchdogStatus::new(HealthStatus::Amber, freshness, "WARN: DRIFT");
    }
    WatchdogStatus::new(HealthStatus::Green, freshness, "HEALTHY")
}
