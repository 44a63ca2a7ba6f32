/// CPU architecture of a parsed ELF, as given by `e_machine`.
///
/// The backport pipeline only ever deals with the two architectures PS5
/// binaries ship for; anything else is retained as `Unknown` so callers can
/// still report on (but not stub) such a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Arch {
    X86_64,
    Aarch64,
    Unknown(u16),
}

/// `e_machine` value for x86-64 (`EM_X86_64`).
pub const EM_X86_64: u16 = 0x3E;
/// `e_machine` value for aarch64 (`EM_AARCH64`).
pub const EM_AARCH64: u16 = 0xB7;

impl Arch {
    /// Maps a raw `e_machine` field to an [`Arch`].
    pub fn from_e_machine(e_machine: u16) -> Self {
        match e_machine {
            EM_X86_64 => Arch::X86_64,
            EM_AARCH64 => Arch::Aarch64,
            other => Arch::Unknown(other),
        }
    }

    /// Width in bytes of a PLT slot / stub palette entry on this architecture.
    ///
    /// Both supported architectures use 16-byte slots; this is asserted
    /// rather than derived so a future third architecture can't silently
    /// assume it.
    pub fn plt_slot_size(&self) -> usize {
        16
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Arch::X86_64 | Arch::Aarch64)
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arch::X86_64 => write!(f, "x86_64"),
            Arch::Aarch64 => write!(f, "aarch64"),
            Arch::Unknown(m) => write!(f, "unknown(0x{m:x})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_machines() {
        assert_eq!(Arch::from_e_machine(0x3E), Arch::X86_64);
        assert_eq!(Arch::from_e_machine(0xB7), Arch::Aarch64);
    }

    #[test]
    fn unknown_machine_is_retained() {
        assert_eq!(Arch::from_e_machine(0x03), Arch::Unknown(0x03));
    }
}
