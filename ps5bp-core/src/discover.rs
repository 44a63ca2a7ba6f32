use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const CANDIDATE_EXTENSIONS: [&str; 3] = ["sprx", "prx", "bin"];

/// Recursively walks `root`, returning every file whose lowercased name
/// ends in `.sprx`, `.prx`, or `.bin`.
pub fn discover_candidates(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else { continue };
        let lower = name.to_lowercase();
        if CANDIDATE_EXTENSIONS.iter().any(|ext| lower.ends_with(&format!(".{ext}"))) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_candidate_extensions_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eboot.bin"), b"x").unwrap();
        std::fs::write(dir.path().join("libkernel.sprx"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("README.PRX"), b"x").unwrap();

        let found = discover_candidates(dir.path());
        let names: Vec<_> = found.iter().map(|p| p.file_name().unwrap().to_str().unwrap().to_string()).collect();
        assert!(names.contains(&"eboot.bin".to_string()));
        assert!(names.contains(&"libkernel.sprx".to_string()));
        assert!(names.contains(&"README.PRX".to_string()));
        assert!(!names.contains(&"notes.txt".to_string()));
    }
}
