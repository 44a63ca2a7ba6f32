use std::collections::HashMap;
use std::path::Path;

use ps5bp_common::{Error, Result};
use serde::{Deserialize, Serialize};

pub use crate::static_db::FAKELIB_REQUIRED;

#[derive(Debug, Clone, Deserialize, Serialize)]
struct FakelibEntry {
    fw_version: String,
    files: Vec<String>,
    #[serde(default)]
    is_recommended: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct FakelibPayload {
    fakelibs: Vec<FakelibEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct FakelibManifest {
    payloads: FakelibPayload,
}

/// Fakelib availability, keyed by target firmware major version (as a
/// string, e.g. `"7"`) to the set of replacement binaries shipped for it.
#[derive(Debug, Clone, Default)]
pub struct FakelibAvailability {
    by_major: HashMap<String, Vec<String>>,
    recommended: HashMap<String, bool>,
}

impl FakelibAvailability {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let manifest: FakelibManifest = serde_json::from_slice(&data)
            .map_err(|e| Error::malformed(format!("{}: invalid fakelib manifest: {e}", path.display())))?;

        let mut by_major = HashMap::new();
        let mut recommended = HashMap::new();
        for entry in manifest.payloads.fakelibs {
            recommended.insert(entry.fw_version.clone(), entry.is_recommended);
            by_major.insert(entry.fw_version, entry.files);
        }
        Ok(FakelibAvailability { by_major, recommended })
    }

    /// Base name with any `lib`/`.sprx`/`.prx` decoration stripped, for
    /// matching against either a full filename or a bare library name.
    fn base_name(name: &str) -> &str {
        let trimmed = name
            .strip_suffix(".sprx")
            .or_else(|| name.strip_suffix(".prx"))
            .or_else(|| name.strip_suffix(".elf"))
            .unwrap_or(name);
        trimmed
    }

    /// True if `library_name` (full filename or base name) has a fakelib
    /// registered for `fw_major` (e.g. `"7"`).
    pub fn is_available(&self, fw_major: &str, library_name: &str) -> bool {
        let wanted = Self::base_name(library_name);
        self.by_major
            .get(fw_major)
            .map(|files| files.iter().any(|f| Self::base_name(f).eq_ignore_ascii_case(wanted)))
            .unwrap_or(false)
    }

    pub fn files_for(&self, fw_major: &str) -> &[String] {
        self.by_major.get(fw_major).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_recommended(&self, fw_major: &str) -> bool {
        self.recommended.get(fw_major).copied().unwrap_or(false)
    }

    pub fn has_any_for(&self, fw_major: &str) -> bool {
        self.by_major.get(fw_major).map(|f| !f.is_empty()).unwrap_or(false)
    }
}

/// True if `library_name` is in the fixed fakelib-required set: libraries
/// whose ABI changes enough across major firmware revisions that a PLT
/// stub cannot stand in for them.
pub fn requires_fakelib(library_name: &str) -> bool {
    let base = library_name
        .strip_suffix(".sprx")
        .or_else(|| library_name.strip_suffix(".prx"))
        .unwrap_or(library_name);
    FAKELIB_REQUIRED.iter().any(|req| *req == base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> &'static str {
        r#"{
            "payloads": {
                "fakelibs": [
                    { "fw_version": "7", "files": ["libSceFiber.sprx", "libSceAgc.sprx"], "is_recommended": true },
                    { "fw_version": "9", "files": [], "is_recommended": false }
                ]
            }
        }"#
    }

    #[test]
    fn matches_full_filename_and_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fakelibs.json");
        std::fs::write(&path, sample_manifest()).unwrap();
        let db = FakelibAvailability::load(&path).unwrap();

        assert!(db.is_available("7", "libSceFiber.sprx"));
        assert!(db.is_available("7", "libSceFiber"));
        assert!(!db.is_available("7", "libSceGnmDriver"));
        assert!(!db.is_available("9", "libSceFiber"));
    }

    #[test]
    fn fixed_required_set_matches_known_names() {
        assert!(requires_fakelib("libSceAgc.sprx"));
        assert!(requires_fakelib("libSceFiber"));
        assert!(!requires_fakelib("libkernel.sprx"));
    }

    #[test]
    fn recommendation_flag_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fakelibs.json");
        std::fs::write(&path, sample_manifest()).unwrap();
        let db = FakelibAvailability::load(&path).unwrap();
        assert!(db.is_recommended("7"));
        assert!(!db.is_recommended("9"));
        assert!(db.has_any_for("7"));
        assert!(!db.has_any_for("9"));
    }
}
