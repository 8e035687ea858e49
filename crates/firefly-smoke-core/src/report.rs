// crates/firefly-smoke-core/src/report.rs
// ============================================================================
// Module: Suite Reports
// Description: Per-example outcomes and suite summaries.
// Purpose: Turn check results into pass/fail records and on-disk summaries.
// Dependencies: serde, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! A [`SuiteReport`] holds one [`CaseOutcome`] per example. The suite passes
//! only when it ran at least one case and every case passed.
//! [`ReportWriter`] persists the report as canonical JSON (`summary.json`)
//! and Markdown (`summary.md`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::harness::CheckError;
use crate::harness::CheckStage;
use crate::harness::CheckSummary;
use crate::harness::millis;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Verdict of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Build, start, and every update succeeded.
    Pass,
    /// Some stage failed.
    Fail,
}

impl CaseStatus {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// Recorded outcome of one example's check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseOutcome {
    /// Example name.
    pub example: String,
    /// Verdict.
    pub status: CaseStatus,
    /// App id launched, when known.
    pub app_id: Option<String>,
    /// Failing stage, for failures.
    pub stage: Option<CheckStage>,
    /// Failing tick, for update failures.
    pub tick: Option<u32>,
    /// Error message, for failures.
    pub message: Option<String>,
    /// Update ticks requested.
    pub updates_requested: u32,
    /// Update ticks that completed.
    pub updates_completed: u32,
    /// Case wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Retained work area path, when kept.
    pub work_area: Option<String>,
}

impl CaseOutcome {
    /// Builds an outcome from a check result.
    #[must_use]
    pub fn from_result(
        example: &str,
        result: &Result<CheckSummary, CheckError>,
        updates: NonZeroU32,
        work_area: Option<String>,
    ) -> Self {
        match result {
            Ok(summary) => Self {
                example: example.to_string(),
                status: CaseStatus::Pass,
                app_id: Some(summary.app_id.to_string()),
                stage: None,
                tick: None,
                message: None,
                updates_requested: updates.get(),
                updates_completed: summary.updates,
                duration_ms: millis(summary.duration),
                work_area,
            },
            Err(err) => Self {
                example: example.to_string(),
                status: CaseStatus::Fail,
                app_id: err.app_id().map(ToString::to_string),
                stage: Some(err.stage()),
                tick: err.tick(),
                message: Some(err.to_string()),
                updates_requested: updates.get(),
                updates_completed: err.tick().map_or(0, |tick| tick.saturating_sub(1)),
                duration_ms: 0,
                work_area,
            },
        }
    }

    /// Overrides the recorded duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = millis(duration);
        self
    }

    /// Returns true when the case passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Pass
    }
}

// ============================================================================
// SECTION: Suite Report
// ============================================================================

/// Outcomes of a whole suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Overall verdict.
    status: CaseStatus,
    /// Number of passing cases.
    passed: usize,
    /// Number of failing cases.
    failed: usize,
    /// Suite wall-clock duration in milliseconds.
    duration_ms: u64,
    /// Per-example outcomes in run order.
    cases: Vec<CaseOutcome>,
}

impl SuiteReport {
    /// Builds a report from case outcomes.
    #[must_use]
    pub fn new(cases: Vec<CaseOutcome>, duration: Duration) -> Self {
        let passed = cases.iter().filter(|case| case.passed()).count();
        let failed = cases.len() - passed;
        let status =
            if !cases.is_empty() && failed == 0 { CaseStatus::Pass } else { CaseStatus::Fail };
        Self {
            status,
            passed,
            failed,
            duration_ms: millis(duration),
            cases,
        }
    }

    /// Returns the per-example outcomes.
    #[must_use]
    pub fn cases(&self) -> &[CaseOutcome] {
        &self.cases
    }

    /// Returns the number of passing cases.
    #[must_use]
    pub const fn passed(&self) -> usize {
        self.passed
    }

    /// Returns the number of failing cases.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// Returns true when at least one case ran and all passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == CaseStatus::Pass
    }

    /// Returns the failing cases.
    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.cases.iter().filter(|case| !case.passed())
    }

    /// Renders the report as Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Smoke Summary\n\n");
        out.push_str("## Status\n\n");
        let _ = writeln!(out, "- Status: {}", self.status.as_str());
        let _ = writeln!(out, "- Passed: {}", self.passed);
        let _ = writeln!(out, "- Failed: {}", self.failed);
        let _ = writeln!(out, "- Duration (ms): {}", self.duration_ms);
        out.push_str("\n## Cases\n\n");
        if self.cases.is_empty() {
            out.push_str("- None\n");
        }
        for case in &self.cases {
            let _ = write!(out, "- {}: {}", case.example, case.status.as_str());
            if let Some(app_id) = &case.app_id {
                let _ = write!(out, " ({app_id})");
            }
            if let Some(message) = &case.message {
                let _ = write!(out, " - {message}");
            }
            out.push('\n');
        }
        out
    }
}

// ============================================================================
// SECTION: Report Writer
// ============================================================================

/// Report persistence errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing a report file failed.
    #[error("report io error at {path}: {message}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },
    /// Serializing the report failed.
    #[error("report serialization failed: {0}")]
    Serialize(String),
}

/// Writes suite reports into a directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    /// Destination directory.
    dir: PathBuf,
}

impl ReportWriter {
    /// JSON summary filename.
    pub const SUMMARY_JSON: &'static str = "summary.json";
    /// Markdown summary filename.
    pub const SUMMARY_MD: &'static str = "summary.md";

    /// Creates a writer targeting `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    /// Returns the destination directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `summary.json` and `summary.md`, returning their paths.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when serialization or a write fails.
    pub fn write(&self, report: &SuiteReport) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(&self.dir).map_err(|err| ReportError::Io {
            path: self.dir.clone(),
            message: err.to_string(),
        })?;
        let json = serde_jcs::to_vec(report).map_err(|err| ReportError::Serialize(err.to_string()))?;
        let json_path = self.write_file(Self::SUMMARY_JSON, &json)?;
        let md_path = self.write_file(Self::SUMMARY_MD, report.to_markdown().as_bytes())?;
        Ok(vec![json_path, md_path])
    }

    /// Writes one file under the destination directory.
    fn write_file(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        let path = self.dir.join(name);
        fs::write(&path, bytes).map_err(|err| ReportError::Io {
            path: path.clone(),
            message: err.to_string(),
        })?;
        Ok(path)
    }
}
