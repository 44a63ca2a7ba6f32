use ps5bp_common::{FirmwareVersion, StubMode, StubRisk};
use serde::Serialize;

/// Functional category used for reporting and the category guesser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Kernel,
    Memory,
    Thread,
    Filesystem,
    Gpu,
    Audio,
    Video,
    Network,
    NpPlatform,
    Trophy,
    SaveData,
    Controller,
    System,
    Ime,
    Dialog,
    Http,
    Ssl,
    Fiber,
    Misc,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Kernel => "kernel",
            Category::Memory => "memory",
            Category::Thread => "thread",
            Category::Filesystem => "filesystem",
            Category::Gpu => "gpu",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Network => "network",
            Category::NpPlatform => "np_platform",
            Category::Trophy => "trophy",
            Category::SaveData => "savedata",
            Category::Controller => "controller",
            Category::System => "system",
            Category::Ime => "ime",
            Category::Dialog => "dialog",
            Category::Http => "http",
            Category::Ssl => "ssl",
            Category::Fiber => "fiber",
            Category::Misc => "misc",
        };
        f.write_str(s)
    }
}

/// Where a [`Classification`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Database,
    HeuristicPrefix,
    HeuristicSuffix,
    Unknown,
}

/// The curated static entry for one well-known symbol.
#[derive(Debug, Clone, Copy)]
pub struct StaticSymbolInfo {
    pub library: &'static str,
    pub category: Category,
    pub min_firmware: FirmwareVersion,
    pub stub_risk: StubRisk,
    pub stub_mode: StubMode,
}

/// Result of classifying a symbol by name, regardless of which table matched.
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: Category,
    pub stub_risk: StubRisk,
    pub stub_mode: StubMode,
    pub source: ClassificationSource,
    pub library: Option<&'static str>,
    pub min_firmware: Option<FirmwareVersion>,
}

/// Static metadata about a known system library.
#[derive(Debug, Clone, Copy)]
pub struct LibraryInfo {
    pub category: Category,
    pub essential: bool,
    pub description: &'static str,
}
