use std::collections::BTreeMap;
use std::path::PathBuf;

use ps5bp_analyze::{AnalysisRisk, FileReport};
use serde::Serialize;

/// Whether one pipeline step ran, was skipped, or failed for one file.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub ran: bool,
    pub note: Option<String>,
}

impl StepOutcome {
    pub fn ran(step: &str) -> Self {
        StepOutcome { step: step.to_string(), ran: true, note: None }
    }

    pub fn skipped(step: &str, note: impl Into<String>) -> Self {
        StepOutcome { step: step.to_string(), ran: false, note: Some(note.into()) }
    }
}

/// Per-file pipeline result.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    pub classification: Option<FileReport>,
    pub steps: Vec<StepOutcome>,
    pub error: Option<String>,
}

/// Aggregated report for one pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub files: Vec<FileResult>,
    pub per_step_counts: BTreeMap<String, u32>,
    pub fakelibs_installed: Vec<String>,
    pub fakelib_source: Option<PathBuf>,
    pub overall_score_mean: f64,
    pub overall_risk_max: Option<AnalysisRisk>,
    pub archive_path: Option<PathBuf>,
    pub elapsed_ms: u128,
}

impl PipelineReport {
    pub fn new() -> Self {
        PipelineReport {
            files: Vec::new(),
            per_step_counts: BTreeMap::new(),
            fakelibs_installed: Vec::new(),
            fakelib_source: None,
            overall_score_mean: 0.0,
            overall_risk_max: None,
            archive_path: None,
            elapsed_ms: 0,
        }
    }

    pub fn record_step(&mut self, step: &str) {
        *self.per_step_counts.entry(step.to_string()).or_insert(0) += 1;
    }

    /// Recomputes `overall_score_mean`/`overall_risk_max` from the
    /// per-file classifications collected so far. Files with no
    /// classification (parse failures) are excluded from the mean.
    pub fn finalize_scores(&mut self) {
        let scored: Vec<&FileReport> = self.files.iter().filter_map(|f| f.classification.as_ref()).collect();
        if scored.is_empty() {
            self.overall_score_mean = 0.0;
            self.overall_risk_max = None;
            return;
        }
        let sum: u32 = scored.iter().map(|r| r.overall_score).sum();
        self.overall_score_mean = sum as f64 / scored.len() as f64;
        self.overall_risk_max = scored.iter().map(|r| r.overall_risk).max();
    }
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self::new()
    }
}
