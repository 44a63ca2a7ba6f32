use sha1::{Digest, Sha1};

/// Computes a NID: the first 8 bytes of `SHA1(name + ":")`, rendered as
/// 16 upper-case hex characters.
///
/// This is the only identity carried through imports in stripped PS5
/// binaries; the computation is deterministic and purely content-addressed.
pub fn compute_nid(name: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(name.as_bytes());
    hasher.update(b":");
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for byte in &digest[..8] {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_sha1_of_name_plus_colon() {
        let name = "sceKernelLoadStartModule";
        let mut hasher = Sha1::new();
        hasher.update(name.as_bytes());
        hasher.update(b":");
        let digest = hasher.finalize();
        let expected: String = digest[..8].iter().map(|b| format!("{b:02X}")).collect();
        assert_eq!(compute_nid(name), expected);
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(compute_nid("sceKernelExit"), compute_nid("sceKernelExit"));
    }
}
