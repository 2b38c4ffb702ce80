//! Auditable calibration artifacts with digest verification.
//!
//! Persists `<dir>/<name>/calibration.json` plus a SHA-256 sidecar digest
//! so a stored report can be integrity-checked before its threshold is
//! trusted.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::calibrate::CalibrationReport;
use crate::domain::{Result, WatchdogError};

fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Persist `<dir>/<name>/calibration.json` and `<dir>/<name>/calibration.digest`.
pub fn write_calibration_artifact(
    report: &CalibrationReport,
    dir: &Path,
    name: &str,
) -> Result<PathBuf> {
    let report_dir = dir.join(name);
    fs::create_dir_all(&report_dir)?;

    let path = report_dir.join("calibration.json");
    let digest_path = report_dir.join("calibration.digest");
    let json = serde_json::to_vec_pretty(report)?;
    let digest = digest_hex(&json);

    fs::write(&path, &json)?;
    fs::write(&digest_path, digest.as_bytes())?;

    Ok(path)
}

/// Read and verify `<dir>/<name>/calibration.json` integrity.
pub fn read_calibration_artifact(dir: &Path, name: &str) -> Result<CalibrationReport> {
    let report_dir = dir.join(name);
    let json = fs::read(report_dir.join("calibration.json"))?;
    let digest = fs::read_to_string(report_dir.join("calibration.digest"))?;

    let actual = digest_hex(&json);
    if digest.trim() != actual {
        return Err(WatchdogError::DigestMismatch {
            expected: digest.trim().to_string(),
            actual,
        });
    }

    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::{calibrate_report, CalibrationParams};
    use crate::corpus::LabeledRun;

    fn sample_report() -> CalibrationReport {
        let corpus = vec![
            LabeledRun::new(vec!["go".to_string(); 30], false),
            LabeledRun::new(
                (0..15).map(|i| format!("step{i}")).collect(),
                true,
            ),
        ];
        calibrate_report(&corpus, &CalibrationParams::default())
    }

    #[test]
    fn test_artifact_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report = sample_report();

        let path = write_calibration_artifact(&report, dir.path(), "sweep-1").expect("write");
        assert!(path.ends_with("sweep-1/calibration.json"));

        let loaded = read_calibration_artifact(dir.path(), "sweep-1").expect("read");
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_tampered_artifact_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report = sample_report();
        let path = write_calibration_artifact(&report, dir.path(), "sweep-1").expect("write");

        let mut json = std::fs::read_to_string(&path).expect("read back");
        json = json.replace("chosen_threshold", "chosen_thresh0ld");
        std::fs::write(&path, json).expect("tamper");

        let err = read_calibration_artifact(dir.path(), "sweep-1").unwrap_err();
        assert!(matches!(err, WatchdogError::DigestMismatch { .. }));
    }

    #[test]
    fn test_missing_artifact_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_calibration_artifact(dir.path(), "absent").unwrap_err();
        assert!(matches!(err, WatchdogError::Io(_)));
    }
}
