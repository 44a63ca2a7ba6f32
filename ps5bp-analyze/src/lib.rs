//! Compatibility analyzer.
//!
//! Joins a parsed ELF's imports ([`ps5bp_elf::ElfInfo`]) against the
//! firmware knowledge base ([`ps5bp_fwdb`]) to produce a per-library and
//! per-file compatibility report: which libraries need a fakelib, which
//! symbols should be stubbed and how, and an overall risk/score summary.

mod analyze;
mod systems;
mod types;

pub use analyze::analyze;
pub use systems::{is_gpu_command_library, is_system_provided};
pub use types::{
    AnalysisRisk, ClassificationSourceDto, FileReport, LibraryReport, MissingSymbol, RecommendedAction,
};
