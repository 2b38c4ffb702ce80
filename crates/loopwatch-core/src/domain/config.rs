//! Watchdog configuration.

use serde::{Deserialize, Serialize};

/// Thresholds and windowing policy for one scorer instance.
///
/// Immutable after construction; a run that needs different tuning gets a
/// fresh scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchdogConfig {
    /// Windowed freshness below this ratio is a kill signal (0.0-1.0).
    pub kill_threshold: f64,

    /// Maximum number of trailing items scored per audit.
    pub window_size: usize,

    /// With fewer items in scope than this, the verdict is always Green
    /// (insufficient evidence).
    pub min_steps: usize,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            kill_threshold: 0.25,
            window_size: 15,
            min_steps: 5,
        }
    }
}

impl WatchdogConfig {
    /// Create a config with explicit values.
    pub fn new(kill_threshold: f64, window_size: usize, min_steps: usize) -> Self {
        Self {
            kill_threshold,
            window_size,
            min_steps,
        }
    }

    /// Override the kill threshold.
    pub fn with_kill_threshold(mut self, kill_threshold: f64) -> Self {
        self.kill_threshold = kill_threshold;
        self
    }

    /// Override the window size.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Override the evidence gate.
    pub fn with_min_steps(mut self, min_steps: usize) -> Self {
        self.min_steps = min_steps;
        self
    }
}
