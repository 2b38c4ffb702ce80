//! Novelty metrics: how fresh a window of normalized items looks.
//!
//! Two built-in strategies cover the common trace shapes. Discrete action
//! signatures score well under [`SignatureUniqueness`] (O(n) per window);
//! free-text messages need [`TokenSetSimilarity`] to catch near-duplicates
//! (O(n²) per window, acceptable because windows hold tens of items and a
//! scorer is queried at most once per step).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{Normalizer, SignatureNormalizer, TextNormalizer};

/// Window-level freshness aggregation over normalized items.
///
/// Implementations must be deterministic and return a ratio in 0.0-1.0,
/// with an empty window scoring 1.0 (vacuously fresh).
pub trait NoveltyMetric: Send + Sync {
    fn window_freshness(&self, window: &[String]) -> f64;
}

/// Built-in strategy selector; pairs each metric with its normalizer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoveltyStrategy {
    /// Distinct-signature ratio over the window.
    #[default]
    SignatureUniqueness,
    /// Mean token-set similarity complement over the window.
    TokenSimilarity,
}

impl NoveltyStrategy {
    /// The metric this strategy scores windows with.
    pub fn metric(self) -> Box<dyn NoveltyMetric> {
        match self {
            Self::SignatureUniqueness => Box::new(SignatureUniqueness),
            Self::TokenSimilarity => Box::new(TokenSetSimilarity),
        }
    }

    /// The normalizer this strategy expects items to pass through.
    pub fn normalizer(self) -> Box<dyn Normalizer> {
        match self {
            Self::SignatureUniqueness => Box::new(SignatureNormalizer),
            Self::TokenSimilarity => Box::new(TextNormalizer),
        }
    }
}

/// Freshness = distinct signatures / window length.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureUniqueness;

impl NoveltyMetric for SignatureUniqueness {
    fn window_freshness(&self, window: &[String]) -> f64 {
        if window.is_empty() {
            return 1.0;
        }
        let distinct: HashSet<&str> = window.iter().map(String::as_str).collect();
        distinct.len() as f64 / window.len() as f64
    }
}

/// Jaccard overlap of whitespace token sets.
///
/// Two empty texts are identical (1.0); exactly one empty text is
/// maximally dissimilar (0.0).
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();
    match (ta.is_empty(), tb.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let intersection = ta.intersection(&tb).count() as f64;
            let union = ta.union(&tb).count() as f64;
            intersection / union
        }
    }
}

/// Mean per-item novelty, where novelty of an item is one minus its
/// maximum similarity to any earlier item in the same window.
///
/// The first item of a window has no earlier items to resemble, so its
/// novelty is 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetSimilarity;

impl NoveltyMetric for TokenSetSimilarity {
    fn window_freshness(&self, window: &[String]) -> f64 {
        if window.is_empty() {
            return 1.0;
        }
        let mut total_novelty = 0.0;
        for (i, item) in window.iter().enumerate() {
            let max_similarity = window[..i]
                .iter()
                .map(|earlier| token_similarity(item, earlier))
                .fold(0.0_f64, f64::max);
            total_novelty += 1.0 - max_similarity;
        }
        (total_novelty / window.len() as f64).clamp(0.0, 1.0)
    }
}
