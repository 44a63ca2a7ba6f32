use std::path::{Path, PathBuf};

const FAKELIB_FILE_EXTENSIONS: [&str; 3] = ["sprx", "prx", "elf"];

/// Locates a source folder of fakelib binaries for `fw_major` (e.g. `"7"`),
/// trying candidate base directories in order: next to the running
/// binary (and up to 4 parent directories above it), then next to the
/// game folder's own parent. A `<base>/<fw_major>/fakelib` directory only
/// counts as a match if it holds at least one `.sprx`/`.prx`/`.elf` file.
pub fn find_fakelib_folder(fw_major: &str, game_dir: &Path) -> Option<PathBuf> {
    for base in candidate_bases(game_dir) {
        let candidate = base.join(fw_major).join("fakelib");
        if is_valid_fakelib_dir(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn candidate_bases(game_dir: &Path) -> Vec<PathBuf> {
    let mut bases = Vec::new();

    if let Ok(exe) = std::env::current_exe() {
        if let Some(mut dir) = exe.parent().map(Path::to_path_buf) {
            bases.push(dir.clone());
            for _ in 0..4 {
                let Some(parent) = dir.parent() else { break };
                let parent = parent.to_path_buf();
                bases.push(parent.clone());
                dir = parent;
            }
        }
    }

    if let Some(parent) = game_dir.parent() {
        bases.push(parent.to_path_buf());
    }

    bases
}

fn is_valid_fakelib_dir(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else { return false };
    entries.flatten().any(|entry| {
        entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| FAKELIB_FILE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    })
}

/// Lists the `.sprx`/`.prx`/`.elf` files inside a fakelib source folder,
/// for copying into `<game>/fakelib/`.
pub fn list_fakelib_files(source: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(source) else { return Vec::new() };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| FAKELIB_FILE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_folder_next_to_games_parent() {
        let root = tempfile::tempdir().unwrap();
        let game_dir = root.path().join("games").join("mygame");
        std::fs::create_dir_all(&game_dir).unwrap();
        let fakelib_dir = root.path().join("games").join("7").join("fakelib");
        std::fs::create_dir_all(&fakelib_dir).unwrap();
        std::fs::write(fakelib_dir.join("libSceAgc.sprx"), b"x").unwrap();

        let found = find_fakelib_folder("7", &game_dir);
        assert_eq!(found, Some(fakelib_dir));
    }

    #[test]
    fn empty_directory_does_not_count_as_a_match() {
        let root = tempfile::tempdir().unwrap();
        let game_dir = root.path().join("games").join("mygame");
        std::fs::create_dir_all(&game_dir).unwrap();
        let fakelib_dir = root.path().join("games").join("7").join("fakelib");
        std::fs::create_dir_all(&fakelib_dir).unwrap();

        assert_eq!(find_fakelib_folder("7", &game_dir), None);
    }

    #[test]
    fn missing_firmware_major_is_none() {
        let root = tempfile::tempdir().unwrap();
        let game_dir = root.path().join("mygame");
        std::fs::create_dir_all(&game_dir).unwrap();
        assert_eq!(find_fakelib_folder("7", &game_dir), None);
    }
}
