use std::path::PathBuf;

use ps5bp_common::FirmwareVersion;
use serde::{Deserialize, Serialize};

/// Single configuration record driving one pipeline run.
///
/// CLI parsing lives outside this crate; a front-end only needs to
/// populate this struct and call [`crate::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub source_fw: FirmwareVersion,
    pub target_fw: FirmwareVersion,

    #[serde(default)]
    pub apply_bps: bool,
    #[serde(default)]
    pub stub_missing: bool,
    #[serde(default)]
    pub resign: bool,
    /// Off by default: the jailbreak itself bypasses firmware checks, so
    /// rewriting the SDK words is unnecessary and risks corrupting the ELF.
    #[serde(default)]
    pub patch_sdk: bool,
    /// Off by default, same rationale as `patch_sdk`.
    #[serde(default)]
    pub patch_param: bool,

    pub exports_dir: PathBuf,
    pub patch_db_path: Option<PathBuf>,
    pub fakelib_manifest_path: Option<PathBuf>,
    pub external_decrypter_path: Option<PathBuf>,
    pub output_report_path: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn target_fw_label(&self) -> String {
        self.target_fw.to_string()
    }

    pub fn source_fw_label(&self) -> String {
        self.source_fw.to_string()
    }
}
