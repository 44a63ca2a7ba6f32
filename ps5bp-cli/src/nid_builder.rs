use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ps5bp_elf::parse_exports;
use ps5bp_fwdb::{ExportsDb, FirmwareExports};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Walks a directory of real firmware system libraries, extracts their
/// exported symbol -> NID tables, and merges the result into the
/// per-firmware exports database.
#[derive(Args, Debug)]
pub struct NidBuildArgs {
    /// Directory containing the firmware's extracted .sprx/.prx libraries.
    #[arg(long)]
    libs_dir: PathBuf,

    /// Firmware version the libraries were pulled from, e.g. "7.00".
    #[arg(long)]
    fw_version: String,

    /// Directory of `<version>.json` per-firmware exports files.
    #[arg(long)]
    exports_dir: PathBuf,
}

pub fn run(args: NidBuildArgs) -> Result<()> {
    let db = ExportsDb::new(&args.exports_dir);
    let mut built = FirmwareExports::default();
    let mut libs_seen = 0u32;
    let mut symbols_seen = 0u32;

    for entry in WalkDir::new(&args.libs_dir).into_iter().filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else { continue };
        let lowered = name.to_ascii_lowercase();
        if !(lowered.ends_with(".sprx") || lowered.ends_with(".prx")) {
            continue;
        }

        let path = entry.path();
        let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let exports = match parse_exports(&data) {
            Ok(exports) => exports,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unparsable library");
                continue;
            }
        };

        libs_seen += 1;
        symbols_seen += exports.len() as u32;
        for export in exports {
            built.insert(name, export.name, export.nid);
        }
    }

    let mut existing = db.for_version(&args.fw_version)?;
    existing.merge(&built);
    db.save_version(&args.fw_version, &existing)?;

    info!(
        fw_version = %args.fw_version,
        libraries = libs_seen,
        symbols = symbols_seen,
        "merged exports into knowledge base"
    );
    Ok(())
}
