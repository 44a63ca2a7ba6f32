use std::collections::HashMap;
use std::path::Path;

use ps5bp_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// `{lib_name: {symbol_name: nid_hex_16}}` for a single firmware version,
/// as produced by the NID export builder and persisted one file per
/// firmware under the knowledge base's exports directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirmwareExports {
    #[serde(flatten)]
    libraries: HashMap<String, HashMap<String, String>>,
}

impl FirmwareExports {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_slice(&data)
            .map_err(|e| Error::malformed(format!("{}: invalid exports JSON: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| Error::malformed(format!("failed to serialize exports: {e}")))?;
        std::fs::write(path, data).map_err(|e| Error::io(path, e))
    }

    pub fn libraries(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    pub fn symbols(&self, library: &str) -> Option<impl Iterator<Item = &str>> {
        self.libraries.get(library).map(|m| m.keys().map(String::as_str))
    }

    pub fn nid_of(&self, library: &str, symbol: &str) -> Option<&str> {
        self.libraries.get(library)?.get(symbol).map(String::as_str)
    }

    pub fn has_symbol(&self, library: &str, symbol: &str) -> bool {
        self.nid_of(library, symbol).is_some()
    }

    pub fn has_nid(&self, library: &str, nid: &str) -> bool {
        self.libraries
            .get(library)
            .map(|m| m.values().any(|v| v.eq_ignore_ascii_case(nid)))
            .unwrap_or(false)
    }

    /// Finds the library owning `symbol` within this firmware's export set,
    /// by linear search across all known libraries.
    pub fn find_owning_library(&self, symbol: &str) -> Option<&str> {
        self.libraries
            .iter()
            .find(|(_, symbols)| symbols.contains_key(symbol))
            .map(|(lib, _)| lib.as_str())
    }

    /// Merges exports from another firmware's export set (e.g. a fresh
    /// builder pass) into this one, new entries overwriting existing ones.
    pub fn merge(&mut self, other: &FirmwareExports) {
        for (lib, symbols) in &other.libraries {
            let entry = self.libraries.entry(lib.clone()).or_default();
            for (symbol, nid) in symbols {
                entry.insert(symbol.clone(), nid.clone());
            }
        }
    }

    pub fn insert(&mut self, library: impl Into<String>, symbol: impl Into<String>, nid: impl Into<String>) {
        self.libraries.entry(library.into()).or_default().insert(symbol.into(), nid.into());
    }
}

/// Directory of per-firmware-version export JSON files, named `<version>.json`.
pub struct ExportsDb {
    root: std::path::PathBuf,
    cache: std::cell::RefCell<HashMap<String, FirmwareExports>>,
}

impl ExportsDb {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        ExportsDb {
            root: root.into(),
            cache: std::cell::RefCell::new(HashMap::new()),
        }
    }

    fn path_for(&self, fw_version: &str) -> std::path::PathBuf {
        self.root.join(format!("{fw_version}.json"))
    }

    /// Loads (and caches) the export set for `fw_version`; a firmware with
    /// no export file yet is treated as an empty, valid export set.
    pub fn for_version(&self, fw_version: &str) -> Result<FirmwareExports> {
        if let Some(cached) = self.cache.borrow().get(fw_version) {
            return Ok(cached.clone());
        }
        let path = self.path_for(fw_version);
        let exports = if path.exists() {
            FirmwareExports::load(&path)?
        } else {
            FirmwareExports::default()
        };
        self.cache.borrow_mut().insert(fw_version.to_string(), exports.clone());
        Ok(exports)
    }

    pub fn save_version(&self, fw_version: &str, exports: &FirmwareExports) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        exports.save(&self.path_for(fw_version))?;
        self.cache.borrow_mut().insert(fw_version.to_string(), exports.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let db = ExportsDb::new(dir.path());
        let mut exports = FirmwareExports::default();
        exports.insert("libkernel.sprx", "sceKernelLoadStartModule", "A4A8B1D0FBF1CA52");
        db.save_version("7.00", &exports).unwrap();

        let loaded = db.for_version("7.00").unwrap();
        assert_eq!(loaded.nid_of("libkernel.sprx", "sceKernelLoadStartModule"), Some("A4A8B1D0FBF1CA52"));
        assert_eq!(loaded.find_owning_library("sceKernelLoadStartModule"), Some("libkernel.sprx"));
    }

    #[test]
    fn missing_version_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = ExportsDb::new(dir.path());
        let exports = db.for_version("99.00").unwrap();
        assert_eq!(exports.libraries().count(), 0);
    }

    #[test]
    fn merge_overwrites_existing_entries() {
        let mut a = FirmwareExports::default();
        a.insert("libkernel.sprx", "sceKernelExit", "0000000000000000");
        let mut b = FirmwareExports::default();
        b.insert("libkernel.sprx", "sceKernelExit", "1111111111111111");
        a.merge(&b);
        assert_eq!(a.nid_of("libkernel.sprx", "sceKernelExit"), Some("1111111111111111"));
    }
}
