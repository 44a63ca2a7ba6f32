/// Top-level orchestrator error, wrapping each component crate's error
/// type as a source, following the nested-error-with-source pattern.
/// Every unwrap/parse/analyze/patch/stub/rewrap component shares a single
/// taxonomy (`ps5bp_common::Error`), so one `#[from]` variant covers all
/// of C1..C7; the remaining variants are ambient I/O concerns that belong
/// to this crate alone (directory walking, archive writing, report
/// serialization).
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Component(#[from] ps5bp_common::Error),

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: std::path::PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
