use std::path::{Path, PathBuf};

use ps5bp_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::apply::apply_patch;

fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRecord {
    pub fw_from: String,
    pub fw_to: String,
    pub lib: String,
    pub patch_relative_path: String,
    #[serde(default)]
    pub sha256_source: Option<String>,
    #[serde(default)]
    pub sha256_target: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PatchManifest {
    patches: Vec<PatchRecord>,
}

/// Read-only patch database, loaded once from a JSON manifest and
/// resolving relative patch paths against the manifest's own directory.
pub struct PatchDatabase {
    root: PathBuf,
    patches: Vec<PatchRecord>,
}

impl PatchDatabase {
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let data = std::fs::read(manifest_path).map_err(|e| Error::io(manifest_path, e))?;
        let manifest: PatchManifest = serde_json::from_slice(&data)
            .map_err(|e| Error::malformed(format!("{}: invalid patch database: {e}", manifest_path.display())))?;
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(PatchDatabase { root, patches: manifest.patches })
    }

    pub fn list_patches(&self) -> &[PatchRecord] {
        &self.patches
    }

    /// Finds the patch record for `(fw_from, fw_to, lib)`, matching the
    /// library name case-insensitively.
    pub fn find_patch(&self, fw_from: &str, fw_to: &str, lib: &str) -> Option<&PatchRecord> {
        self.patches
            .iter()
            .find(|p| p.fw_from == fw_from && p.fw_to == fw_to && p.lib.eq_ignore_ascii_case(lib))
    }

    pub fn resolve_path(&self, record: &PatchRecord) -> PathBuf {
        self.root.join(&record.patch_relative_path)
    }

    /// Walks `folder`, and for every file whose basename matches a patch
    /// record for `(fw_from, fw_to)`, applies that patch and replaces the
    /// original in place. Returns the basenames actually patched.
    pub fn apply_auto(&self, folder: &Path, fw_from: &str, fw_to: &str) -> Result<Vec<String>> {
        let mut applied = Vec::new();
        let entries = std::fs::read_dir(folder).map_err(|e| Error::io(folder, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(folder, e))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(record) = self.find_patch(fw_from, fw_to, name) else {
                continue;
            };

            let source = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
            if let Some(expected) = &record.sha256_source {
                let actual = sha256_hex(&source);
                if !actual.eq_ignore_ascii_case(expected) {
                    return Err(Error::malformed(format!(
                        "{name}: source sha256 mismatch (expected {expected}, found {actual})"
                    )));
                }
            }

            let patch_path = self.resolve_path(record);
            let patch_bytes = std::fs::read(&patch_path).map_err(|e| Error::io(&patch_path, e))?;
            let target = apply_patch(&source, &patch_bytes)?;

            if let Some(expected) = &record.sha256_target {
                let actual = sha256_hex(&target);
                if !actual.eq_ignore_ascii_case(expected) {
                    return Err(Error::malformed(format!(
                        "{name}: target sha256 mismatch after patching (expected {expected}, found {actual})"
                    )));
                }
            }

            std::fs::write(&path, &target).map_err(|e| Error::io(&path, e))?;
            applied.push(name.to_string());
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vlc::write_vlc;

    fn write_manifest(dir: &Path, records: &[PatchRecord]) -> PathBuf {
        let manifest = serde_json::json!({ "patches": records });
        let path = dir.join("patches.json");
        std::fs::write(&path, serde_json::to_vec_pretty(&manifest).unwrap()).unwrap();
        path
    }

    fn build_identity_patch(bytes: &[u8]) -> Vec<u8> {
        let mut patch = b"BPS1".to_vec();
        write_vlc(bytes.len() as u64, &mut patch);
        write_vlc(bytes.len() as u64, &mut patch);
        write_vlc(0, &mut patch);
        write_vlc(((bytes.len() as u64 - 1) << 2) | 0, &mut patch); // SourceRead(len)
        let src_crc = crc32fast::hash(bytes);
        patch.extend_from_slice(&src_crc.to_le_bytes());
        patch.extend_from_slice(&src_crc.to_le_bytes());
        let body_crc = crc32fast::hash(&patch);
        patch.extend_from_slice(&body_crc.to_le_bytes());
        patch
    }

    #[test]
    fn finds_patch_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![PatchRecord {
            fw_from: "9.00".into(),
            fw_to: "7.00".into(),
            lib: "libSceAgc.sprx".into(),
            patch_relative_path: "libSceAgc.bps".into(),
            sha256_source: None,
            sha256_target: None,
        }];
        let manifest_path = write_manifest(dir.path(), &records);
        let db = PatchDatabase::load(&manifest_path).unwrap();
        assert!(db.find_patch("9.00", "7.00", "libsceagc.sprx").is_some());
        assert!(db.find_patch("9.00", "6.00", "libSceAgc.sprx").is_none());
    }

    #[test]
    fn apply_auto_patches_matching_files_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let original = b"original-bytes".to_vec();
        let patch_bytes = build_identity_patch(&original);
        std::fs::write(dir.path().join("libkernel.sprx.bps"), &patch_bytes).unwrap();
        std::fs::write(dir.path().join("libkernel.sprx"), &original).unwrap();

        let records = vec![PatchRecord {
            fw_from: "9.00".into(),
            fw_to: "7.00".into(),
            lib: "libkernel.sprx".into(),
            patch_relative_path: "libkernel.sprx.bps".into(),
            sha256_source: None,
            sha256_target: None,
        }];
        let manifest_path = write_manifest(dir.path(), &records);
        let db = PatchDatabase::load(&manifest_path).unwrap();

        let applied = db.apply_auto(dir.path(), "9.00", "7.00").unwrap();
        assert_eq!(applied, vec!["libkernel.sprx".to_string()]);
        let result = std::fs::read(dir.path().join("libkernel.sprx")).unwrap();
        assert_eq!(result, original);
    }

    #[test]
    fn apply_auto_rejects_source_hash_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let original = b"original-bytes".to_vec();
        let patch_bytes = build_identity_patch(&original);
        std::fs::write(dir.path().join("libkernel.sprx.bps"), &patch_bytes).unwrap();
        std::fs::write(dir.path().join("libkernel.sprx"), &original).unwrap();

        let records = vec![PatchRecord {
            fw_from: "9.00".into(),
            fw_to: "7.00".into(),
            lib: "libkernel.sprx".into(),
            patch_relative_path: "libkernel.sprx.bps".into(),
            sha256_source: Some("0".repeat(64)),
            sha256_target: None,
        }];
        let manifest_path = write_manifest(dir.path(), &records);
        let db = PatchDatabase::load(&manifest_path).unwrap();

        let err = db.apply_auto(dir.path(), "9.00", "7.00").unwrap_err();
        assert!(err.to_string().contains("sha256 mismatch"));
    }
}
