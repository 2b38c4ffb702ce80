//! Rolling-window freshness scoring over one run's history.

use serde::{Deserialize, Serialize};

use crate::domain::WatchdogConfig;
use crate::govern::{self, WatchdogStatus};
use crate::normalize::Normalizer;
use crate::novelty::{NoveltyMetric, NoveltyStrategy};

/// Scope and threshold context attached to a freshness check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreshnessDetails {
    pub window_size: usize,
    pub min_ratio: f64,
    /// Items actually in the scored scope (at most `window_size`).
    pub n_items: usize,
}

/// Pass/fail freshness check over the active window.
///
/// `ok` is false only when the scope holds enough evidence and the ratio
/// fell below the configured minimum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreshnessCheck {
    pub ok: bool,
    pub ratio: f64,
    pub reason: String,
    pub details: FreshnessDetails,
}

/// Per-run freshness scorer.
///
/// Owns the append-only normalized history for exactly one run. History
/// appends are not atomic, so a scorer must not be mutated concurrently;
/// callers tracking several concurrent runs keep one scorer per run.
pub struct FreshnessScorer {
    config: WatchdogConfig,
    history: Vec<String>,
    normalizer: Box<dyn Normalizer>,
    metric: Box<dyn NoveltyMetric>,
}

impl FreshnessScorer {
    /// Scorer with the default signature-uniqueness strategy.
    pub fn new(config: WatchdogConfig) -> Self {
        Self::with_strategy(config, NoveltyStrategy::default())
    }

    /// Scorer with a built-in strategy and its paired normalizer.
    pub fn with_strategy(config: WatchdogConfig, strategy: NoveltyStrategy) -> Self {
        Self::with_parts(config, strategy.normalizer(), strategy.metric())
    }

    /// Scorer with caller-supplied normalizer and novelty metric.
    pub fn with_parts(
        config: WatchdogConfig,
        normalizer: Box<dyn Normalizer>,
        metric: Box<dyn NoveltyMetric>,
    ) -> Self {
        Self {
            config,
            history: Vec::new(),
            normalizer,
            metric,
        }
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Number of recorded (non-dropped) items.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Record one raw item. Items whose normalization drops them are
    /// ignored and do not count as steps. Never fails.
    pub fn record(&mut self, raw: &str) {
        if let Some(normalized) = self.normalizer.normalize(raw) {
            self.history.push(normalized);
        }
    }

    fn scope(&self, use_window: bool) -> &[String] {
        if use_window && self.history.len() > self.config.window_size {
            &self.history[self.history.len() - self.config.window_size..]
        } else {
            &self.history
        }
    }

    /// Freshness ratio over the active scope: the trailing window when
    /// `use_window` is set, the full history otherwise. An empty history
    /// is vacuously fresh (1.0).
    pub fn freshness(&self, use_window: bool) -> f64 {
        self.metric.window_freshness(self.scope(use_window))
    }

    /// Worst windowed freshness anywhere in the history.
    ///
    /// Slides a full-size window across the whole history so a transient
    /// loop is caught even after the tail has recovered. A history no
    /// longer than one window reduces to `freshness` over everything.
    pub fn min_rolling_freshness(&self) -> f64 {
        let w = self.config.window_size;
        if w == 0 || self.history.len() <= w {
            return self.metric.window_freshness(&self.history);
        }
        self.history
            .windows(w)
            .map(|window| self.metric.window_freshness(window))
            .fold(1.0_f64, f64::min)
    }

    /// Threshold check over the active window.
    pub fn evaluate(&self) -> FreshnessCheck {
        let scope = self.scope(true);
        let ratio = self.metric.window_freshness(scope);
        let n_items = scope.len();

        let (ok, reason) = if n_items < self.config.min_steps {
            (true, "insufficient history".to_string())
        } else if ratio < self.config.kill_threshold {
            (
                false,
                format!(
                    "freshness {ratio:.3} below minimum {:.2}",
                    self.config.kill_threshold
                ),
            )
        } else {
            (true, "freshness above minimum".to_string())
        };

        FreshnessCheck {
            ok,
            ratio,
            reason,
            details: FreshnessDetails {
                window_size: self.config.window_size,
                min_ratio: self.config.kill_threshold,
                n_items,
            },
        }
    }

    /// Three-state audit of the active window.
    pub fn audit(&self) -> WatchdogStatus {
        let scope = self.scope(true);
        govern::evaluate_status(
            self.metric.window_freshness(scope),
            scope.len(),
            &self.config,
        )
    }
}
