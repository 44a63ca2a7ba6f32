use std::path::PathBuf;

/// Crate-wide error taxonomy.
///
/// Two of the seven kinds named by the pipeline's error taxonomy,
/// resolution misses and stub-policy refusals, are deliberately **not**
/// variants here: they are expected outcomes on otherwise successful paths
/// (`not_found` / `skipped_critical`) and are modeled as plain values in the
/// relevant result structs instead of errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("unknown target: {0}")]
    UnknownTarget(String),

    #[error("external tool failure: {tool}: {detail}")]
    ExternalToolFailure { tool: String, detail: String },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Error::MalformedInput(detail.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
