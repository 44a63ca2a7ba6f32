/// Libraries assumed backward-compatible across any firmware gap unless
/// they also appear in the fakelib-required set. These are the platform's
/// own system libraries rather than game-bundled middleware.
const SYSTEM_PROVIDED: &[&str] = &[
    "libkernel",
    "libSceVideoOut",
    "libSceAudioOut",
    "libScePad",
    "libSceUserService",
    "libSceSystemService",
    "libSceSysmodule",
    "libSceLibcInternal",
    "libScePosix",
];

pub fn is_system_provided(library_name: &str) -> bool {
    let base = library_name
        .strip_suffix(".sprx")
        .or_else(|| library_name.strip_suffix(".prx"))
        .unwrap_or(library_name);
    SYSTEM_PROVIDED.iter().any(|s| s.eq_ignore_ascii_case(base))
}

/// Strips the GPU-command-library family down to a base name for the
/// AGC/GNM-family check in the per-library recommendation rules.
pub fn is_gpu_command_library(library_name: &str) -> bool {
    let lower = library_name.to_ascii_lowercase();
    lower.contains("agc") || lower.contains("gnm")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_system_libraries_with_or_without_extension() {
        assert!(is_system_provided("libkernel.sprx"));
        assert!(is_system_provided("libkernel"));
        assert!(!is_system_provided("libSceSaveData.sprx"));
    }

    #[test]
    fn gpu_command_family_matches_agc_and_gnm() {
        assert!(is_gpu_command_library("libSceAgc.sprx"));
        assert!(is_gpu_command_library("libSceAgcDriver.sprx"));
        assert!(is_gpu_command_library("libSceGnmDriver.sprx"));
        assert!(!is_gpu_command_library("libSceHttp.sprx"));
    }
}
