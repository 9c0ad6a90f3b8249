//! Suite report model

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::CandidateSource;
use crate::verify::{FailureReason, VerificationResult};

/// File name of the JSON report inside the output directory
pub const REPORT_FILE_NAME: &str = "transcheck-report.json";

/// One failed case, as listed in the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureEntry {
    pub id: String,
    pub reason: Option<FailureReason>,
    pub source: CandidateSource,
    pub raw_candidate: String,
    pub cleaned_payload: String,
    pub expected: String,
}

impl From<&VerificationResult> for FailureEntry {
    fn from(result: &VerificationResult) -> Self {
        Self {
            id: result.id.clone(),
            reason: result.reason,
            source: result.source,
            raw_candidate: result.raw_candidate.clone(),
            cleaned_payload: result.cleaned_payload.clone(),
            expected: result.expected.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum UiOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

/// Result of a UI behaviour check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiCheckResult {
    pub name: String,
    pub outcome: UiOutcome,
}

impl UiCheckResult {
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: UiOutcome::Passed,
        }
    }

    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: UiOutcome::Failed(reason.into()),
        }
    }

    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: UiOutcome::Skipped(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, UiOutcome::Failed(_))
    }
}

/// Aggregate of one suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub target_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Cases never run because the suite stopped early
    pub skipped: usize,
    pub results: Vec<VerificationResult>,
    pub failures: Vec<FailureEntry>,
    #[serde(default)]
    pub ui_checks: Vec<UiCheckResult>,
}

impl SuiteReport {
    pub fn new(
        target_url: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        results: Vec<VerificationResult>,
        skipped: usize,
    ) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        let failures: Vec<FailureEntry> = results
            .iter()
            .filter(|r| !r.passed())
            .map(FailureEntry::from)
            .collect();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        Self {
            target_url: target_url.into(),
            started_at,
            finished_at,
            duration_ms,
            total: results.len() + skipped,
            passed,
            failed: failures.len(),
            skipped,
            results,
            failures,
            ui_checks: Vec::new(),
        }
    }

    pub fn with_ui_checks(mut self, checks: Vec<UiCheckResult>) -> Self {
        self.ui_checks = checks;
        self
    }

    /// No case failed and no UI check failed
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && !self.ui_checks.iter().any(UiCheckResult::is_failure)
    }

    /// Write pretty JSON into `dir`, returning the report path
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE_NAME);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::Verdict;
    use chrono::Duration;
    use tempfile::TempDir;

    fn result(id: &str, reason: Option<FailureReason>) -> VerificationResult {
        VerificationResult {
            id: id.into(),
            input: "mama yanavaa".into(),
            raw_candidate: "මම යනවා".into(),
            source: CandidateSource::Control,
            cleaned_payload: "මම යනවා".into(),
            expected: "මම යනවා".into(),
            verdict: if reason.is_none() { Verdict::Pass } else { Verdict::Fail },
            reason,
        }
    }

    fn sample() -> SuiteReport {
        let started = Utc::now();
        SuiteReport::new(
            "https://www.swifttranslator.com/",
            started,
            started + Duration::milliseconds(1500),
            vec![
                result("Pos_Fun_0001", None),
                result("Neg_Fun_0001", Some(FailureReason::Mismatch)),
                result("Pos_Fun_0002", None),
            ],
            2,
        )
    }

    #[test]
    fn test_totals() {
        let report = sample();
        assert_eq!(report.total, 5);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.duration_ms, 1500);
        assert_eq!(report.failures[0].id, "Neg_Fun_0001");
        assert_eq!(report.failures[0].reason, Some(FailureReason::Mismatch));
        assert!(!report.all_passed());
    }

    #[test]
    fn test_ui_failure_fails_suite() {
        let started = Utc::now();
        let report = SuiteReport::new("u", started, started, vec![result("a", None)], 0);
        assert!(report.all_passed());

        let report = report.with_ui_checks(vec![
            UiCheckResult::skipped("clear-resets-input", "no clear button"),
        ]);
        assert!(report.all_passed());

        let report = report.with_ui_checks(vec![UiCheckResult::failed(
            "real-time-update",
            "output control is empty",
        )]);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let report = sample().with_ui_checks(vec![UiCheckResult::passed("real-time-update")]);

        let path = report.write(&dir.path().join("out")).unwrap();
        assert!(path.ends_with(REPORT_FILE_NAME));

        let loaded = SuiteReport::load(&path).unwrap();
        assert_eq!(loaded, report);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["failures"][0]["rawCandidate"], "මම යනවා");
        assert_eq!(json["uiChecks"][0]["outcome"]["status"], "passed");
    }
}
