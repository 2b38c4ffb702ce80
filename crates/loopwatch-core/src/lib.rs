//! Loopwatch Core Library
//!
//! Detects low-novelty repetition ("zombie loops") in autonomous agent
//! traces. A [`FreshnessScorer`] accumulates normalized actions for one run
//! and scores how fresh the recent window looks; the governor maps that
//! ratio to a Green/Amber/Red verdict, and [`calibrate`] fits the kill
//! threshold against a corpus of labeled historical runs.

pub mod artifact;
pub mod calibrate;
pub mod corpus;
pub mod domain;
pub mod govern;
pub mod normalize;
pub mod novelty;
pub mod scorer;
pub mod telemetry;

pub use artifact::{read_calibration_artifact, write_calibration_artifact};

pub use calibrate::{
    calibrate, calibrate_report, CalibrationObjective, CalibrationParams, CalibrationReport,
    CandidateScore,
};

pub use corpus::{load_labeled_runs, LabeledRun};

pub use domain::{Result, WatchdogConfig, WatchdogError};

pub use govern::{evaluate_status, HealthStatus, WatchdogStatus, DRIFT_MARGIN};

pub use normalize::{Normalizer, SignatureNormalizer, TextNormalizer};

pub use novelty::{
    token_similarity, NoveltyMetric, NoveltyStrategy, SignatureUniqueness, TokenSetSimilarity,
};

pub use scorer::{FreshnessCheck, FreshnessDetails, FreshnessScorer};

pub use telemetry::init_tracing;
