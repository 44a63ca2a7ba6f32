use ps5bp_common::{Arch, StubMode};

/// One 16-byte instruction sequence for a given architecture/mode pair.
pub type StubBytes = [u8; 16];

const X86_64_NOP: StubBytes = [0x90; 16];
const X86_64_RET_ZERO: StubBytes = [
    0x31, 0xC0, 0xC3, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90,
];
const X86_64_RET_ERROR: StubBytes = [
    0xB8, 0xFF, 0xFF, 0xFF, 0xFF, 0xC3, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90,
];

const AARCH64_NOP: StubBytes = [
    0x1F, 0x20, 0x03, 0xD5, 0x1F, 0x20, 0x03, 0xD5, 0x1F, 0x20, 0x03, 0xD5, 0x1F, 0x20, 0x03, 0xD5,
];
const AARCH64_RET_ZERO: StubBytes = [
    0xE0, 0x03, 0x1F, 0xAA, 0xC0, 0x03, 0x5F, 0xD6, 0x1F, 0x20, 0x03, 0xD5, 0x1F, 0x20, 0x03, 0xD5,
];
const AARCH64_RET_ERROR: StubBytes = [
    0xE0, 0x03, 0x1F, 0x92, 0xC0, 0x03, 0x5F, 0xD6, 0x1F, 0x20, 0x03, 0xD5, 0x1F, 0x20, 0x03, 0xD5,
];

/// Returns the 16-byte instruction sequence for `mode` on `arch`, or `None`
/// if `mode` is [`StubMode::Skip`] (not a palette entry; the caller must
/// leave the slot untouched) or `arch` has no known palette.
pub fn palette_entry(arch: Arch, mode: StubMode) -> Option<StubBytes> {
    match (arch, mode) {
        (Arch::X86_64, StubMode::Nop) => Some(X86_64_NOP),
        (Arch::X86_64, StubMode::RetZero) => Some(X86_64_RET_ZERO),
        (Arch::X86_64, StubMode::RetError) => Some(X86_64_RET_ERROR),
        (Arch::Aarch64, StubMode::Nop) => Some(AARCH64_NOP),
        (Arch::Aarch64, StubMode::RetZero) => Some(AARCH64_RET_ZERO),
        (Arch::Aarch64, StubMode::RetError) => Some(AARCH64_RET_ERROR),
        (_, StubMode::Skip) | (Arch::Unknown(_), _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x86_64_ret_zero_matches_known_bytes() {
        let bytes = palette_entry(Arch::X86_64, StubMode::RetZero).unwrap();
        assert_eq!(
            bytes,
            [0x31, 0xC0, 0xC3, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90]
        );
    }

    #[test]
    fn skip_mode_has_no_palette_entry() {
        assert_eq!(palette_entry(Arch::X86_64, StubMode::Skip), None);
        assert_eq!(palette_entry(Arch::Aarch64, StubMode::Skip), None);
    }

    #[test]
    fn unknown_arch_has_no_palette_entry() {
        assert_eq!(palette_entry(Arch::Unknown(0x1234), StubMode::Nop), None);
    }
}
