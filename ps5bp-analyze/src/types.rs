use ps5bp_common::{FirmwareGapLevel, StubMode, StubRisk};
use ps5bp_fwdb::{Category, ClassificationSource};
use serde::Serialize;

/// Action recommended for one required library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    UseFakelib,
    FakelibNeeded,
    StubRisky,
    StubFunctions,
    CheckCompat,
    None,
}

/// File/library-level risk, distinct from the per-symbol [`StubRisk`]: this
/// adds a `None` floor below `Low` for libraries with no finding at all,
/// ordered `none < low < medium < high < critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisRisk {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AnalysisRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisRisk::None => "none",
            AnalysisRisk::Low => "low",
            AnalysisRisk::Medium => "medium",
            AnalysisRisk::High => "high",
            AnalysisRisk::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// A symbol imported from some library but not available on the target
/// firmware, classified by the knowledge base.
#[derive(Debug, Clone, Serialize)]
pub struct MissingSymbol {
    pub name: String,
    pub category: Category,
    pub stub_risk: StubRisk,
    pub stub_mode: StubMode,
    pub source: ClassificationSourceDto,
}

/// Serializable mirror of [`ClassificationSource`] (that type has no
/// `Serialize` impl since it is firmware-agnostic vocabulary shared with
/// non-serialized call sites).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSourceDto {
    Database,
    HeuristicPrefix,
    HeuristicSuffix,
    Unknown,
}

impl From<ClassificationSource> for ClassificationSourceDto {
    fn from(value: ClassificationSource) -> Self {
        match value {
            ClassificationSource::Database => ClassificationSourceDto::Database,
            ClassificationSource::HeuristicPrefix => ClassificationSourceDto::HeuristicPrefix,
            ClassificationSource::HeuristicSuffix => ClassificationSourceDto::HeuristicSuffix,
            ClassificationSource::Unknown => ClassificationSourceDto::Unknown,
        }
    }
}

/// Per-library compatibility finding.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryReport {
    pub library: String,
    pub category: Category,
    pub essential: bool,
    pub has_fakelib: bool,
    pub missing_symbols: Vec<MissingSymbol>,
    pub risk: AnalysisRisk,
    pub score: u32,
    pub action: RecommendedAction,
}

/// Full per-file compatibility report.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub required_libraries: Vec<LibraryReport>,
    pub fw_gap: u32,
    pub fw_gap_level: FirmwareGapLevel,
    pub overall_score: u32,
    pub overall_risk: AnalysisRisk,
    pub also_recommend: Vec<String>,
    pub warnings: Vec<String>,
}
