//! Labeled run corpus: calibration input loaded from historical traces.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Result;

/// One historical run with its ground-truth outcome.
///
/// Never mutated by calibration; every candidate threshold replays the
/// same actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabeledRun {
    /// Optional display name for reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Raw actions or messages in arrival order.
    pub actions: Vec<String>,

    /// Whether the run ultimately succeeded.
    pub success: bool,
}

impl LabeledRun {
    pub fn new(actions: Vec<String>, success: bool) -> Self {
        Self {
            name: None,
            actions,
            success,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Load a JSON array of labeled runs from disk.
pub fn load_labeled_runs(path: &Path) -> Result<Vec<LabeledRun>> {
    let bytes = fs::read(path)?;
    let runs: Vec<LabeledRun> = serde_json::from_slice(&bytes)?;
    info!(event = "corpus.loaded", path = %path.display(), runs = runs.len());
    Ok(runs)
}
