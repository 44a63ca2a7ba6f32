use std::fs;
use std::path::{Path, PathBuf};

use ps5bp_common::{FirmwareVersion, Result};
use ps5bp_param::{patch_param_json, patch_param_sfo};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Walks `game_dir` for `param.json`/`param.sfo` files and rewrites their
/// firmware-version metadata to `target_fw`, returning the paths of any
/// files actually changed.
pub fn patch_oob_metadata(game_dir: &Path, target_fw: FirmwareVersion) -> Result<Vec<PathBuf>> {
    let mut patched = Vec::new();

    for entry in WalkDir::new(game_dir).into_iter().filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else { continue };
        let path = entry.path();

        match name {
            "param.json" => {
                let original = fs::read_to_string(path).map_err(|e| ps5bp_common::Error::io(path, e))?;
                let rewritten = patch_param_json(&original, target_fw)?;
                if rewritten != original {
                    fs::write(path, &rewritten).map_err(|e| ps5bp_common::Error::io(path, e))?;
                    info!(file = %path.display(), "param.json patched");
                    patched.push(path.to_path_buf());
                } else {
                    info!(file = %path.display(), "param.json already at target");
                }
            }
            "param.sfo" => {
                let mut data = fs::read(path).map_err(|e| ps5bp_common::Error::io(path, e))?;
                match patch_param_sfo(&mut data, target_fw) {
                    Ok(true) => {
                        fs::write(path, &data).map_err(|e| ps5bp_common::Error::io(path, e))?;
                        info!(file = %path.display(), "param.sfo SYSTEM_VER patched");
                        patched.push(path.to_path_buf());
                    }
                    Ok(false) => info!(file = %path.display(), "param.sfo already at target or no SYSTEM_VER key"),
                    Err(e) => warn!(file = %path.display(), error = %e, "param.sfo patch failed"),
                }
            }
            _ => {}
        }
    }

    Ok(patched)
}
