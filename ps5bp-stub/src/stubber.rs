use ps5bp_common::{Arch, StubMode};
use ps5bp_elf::{decode_import_name, ElfInfo};

use crate::palette::palette_entry;
use crate::scan::PltAddressMap;

/// Outcome of a single stub request, mirroring the taxonomy's two
/// non-error outcomes (§7): a resolution miss and a policy refusal are
/// not errors, just different flavors of "nothing was written".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubOutcome {
    Stubbed { offset: u64 },
    NotFound,
    SkippedCritical { offset: u64 },
}

/// PLT stubber bound to one in-memory ELF byte buffer and its address map.
pub struct Stubber<'a> {
    data: &'a mut [u8],
    arch: Arch,
    map: PltAddressMap,
}

impl<'a> Stubber<'a> {
    /// Builds the address map once; reused for every stub request against
    /// this buffer.
    pub fn new(data: &'a mut [u8], elf: &ElfInfo) -> Self {
        let map = PltAddressMap::build(data, &elf.executable_segments);
        Stubber { data, arch: elf.arch, map }
    }

    pub fn address_map(&self) -> &PltAddressMap {
        &self.map
    }

    /// Finds the import's PLT relocation by matching the requested name
    /// against each symbol's decoded NID (the usual case, since in-binary
    /// import names are `NID#LIB#MODULE`), falling back to a literal
    /// raw-name match for synthetic/test symbols that skip encoding.
    fn plt_relocation_for<'e>(&self, elf: &'e ElfInfo, name: &str) -> Option<&'e ps5bp_elf::PltRelocation> {
        let wanted_nid = decode_import_name(name).map(|d| d.nid);
        let symbol_index = elf.symbols.iter().position(|s| match (&wanted_nid, decode_import_name(&s.name)) {
            (Some(wanted), Some(decoded)) => decoded.nid.eq_ignore_ascii_case(wanted),
            _ => s.name == name,
        })?;
        elf.plt_relocations.iter().find(|r| r.symbol_index as usize == symbol_index)
    }

    /// Stubs one symbol by name with the given mode. `name` may be either
    /// a raw encoded import name or a plain decoded NID string; both are
    /// matched the same way a real in-binary symbol lookup would.
    pub fn stub_symbol(&mut self, elf: &ElfInfo, name: &str, mode: StubMode) -> StubOutcome {
        let Some(reloc) = self.plt_relocation_for(elf, name) else {
            return StubOutcome::NotFound;
        };
        let got_vaddr = reloc.got_vaddr;
        let Some(offset) = self.map.slot_offset_for(got_vaddr) else {
            return StubOutcome::NotFound;
        };

        if mode == StubMode::Skip {
            return StubOutcome::SkippedCritical { offset };
        }

        let Some(bytes) = palette_entry(self.arch, mode) else {
            return StubOutcome::NotFound;
        };

        let start = offset as usize;
        let end = start + bytes.len();
        if end > self.data.len() {
            return StubOutcome::NotFound;
        }
        self.data[start..end].copy_from_slice(&bytes);
        StubOutcome::Stubbed { offset }
    }

    /// Applies one fixed mode to every name in `names`, used when no
    /// per-symbol classification is available.
    pub fn stub_missing(&mut self, elf: &ElfInfo, names: &[String], mode: StubMode) -> Vec<(String, StubOutcome)> {
        names.iter().map(|n| (n.clone(), self.stub_symbol(elf, n, mode))).collect()
    }

    /// Overwrites the 8-byte GOT slot at `got_vaddr` with an absolute
    /// `target` address, used when redirecting to an in-process stub
    /// synthesized elsewhere rather than rewriting the PLT slot itself.
    pub fn redirect_got(&mut self, elf: &ElfInfo, got_vaddr: u64, target: u64) -> bool {
        let Some(file_offset) = elf
            .loadable_segments
            .iter()
            .find_map(|s| s.vaddr_to_offset(got_vaddr))
        else {
            return false;
        };
        let start = file_offset as usize;
        let end = start + 8;
        if end > self.data.len() {
            return false;
        }
        self.data[start..end].copy_from_slice(&target.to_le_bytes());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps5bp_common::compute_nid;
    use ps5bp_elf::{PltRelocation, Segment, Symbol, SymbolBinding, SymbolKind};

    fn make_elf_with_plt(nid: &str) -> (Vec<u8>, ElfInfo) {
        // executable segment: one PLT slot at file offset 0, vaddr 0x1000,
        // jumping to GOT vaddr 0x3000.
        let mut data = vec![0x90u8; 16];
        data[0] = 0xFF;
        data[1] = 0x25;
        let disp: i32 = 0x3000 - (0x1000 + 6);
        data[2..6].copy_from_slice(&disp.to_le_bytes());

        let exec_segment = Segment {
            p_type: 0x1,
            file_offset: 0,
            virtual_address: 0x1000,
            file_size: 16,
            memory_size: 16,
            is_executable: true,
        };

        let symbol = Symbol {
            name: format!("{nid}#libkernel#libkernel"),
            binding: SymbolBinding::Global,
            kind: SymbolKind::Function,
            section_index: 0,
            value: 0,
            size: 0,
        };

        let reloc = PltRelocation {
            got_vaddr: 0x3000,
            symbol_index: 0,
            relocation_kind: 7,
            addend: 0,
        };

        let elf = ElfInfo {
            arch: Arch::X86_64,
            e_type: 0xFE10,
            loadable_segments: vec![exec_segment],
            executable_segments: vec![exec_segment],
            needed_libraries: vec!["libkernel.sprx".to_string()],
            symbols: vec![symbol],
            plt_relocations: vec![reloc],
            param_segment: None,
        };

        (data, elf)
    }

    #[test]
    fn stubs_resolved_symbol_with_ret_zero() {
        let nid = compute_nid("sceKernelExit");
        let (mut data, elf) = make_elf_with_plt(&nid);
        let mut stubber = Stubber::new(&mut data, &elf);
        let outcome = stubber.stub_symbol(&elf, &format!("{nid}#libkernel#libkernel"), StubMode::RetZero);
        assert_eq!(outcome, StubOutcome::Stubbed { offset: 0 });
        assert_eq!(
            &data[0..16],
            &[0x31, 0xC0, 0xC3, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90]
        );
    }

    #[test]
    fn skip_mode_leaves_bytes_untouched() {
        let nid = compute_nid("sceKernelExit");
        let (mut data, elf) = make_elf_with_plt(&nid);
        let before = data.clone();
        let mut stubber = Stubber::new(&mut data, &elf);
        let outcome = stubber.stub_symbol(&elf, &format!("{nid}#libkernel#libkernel"), StubMode::Skip);
        assert!(matches!(outcome, StubOutcome::SkippedCritical { .. }));
        assert_eq!(data, before);
    }

    #[test]
    fn unknown_symbol_is_not_found() {
        let nid = compute_nid("sceKernelExit");
        let (mut data, elf) = make_elf_with_plt(&nid);
        let mut stubber = Stubber::new(&mut data, &elf);
        let other_nid = compute_nid("sceSomethingElse");
        let outcome = stubber.stub_symbol(&elf, &format!("{other_nid}#libkernel#libkernel"), StubMode::RetZero);
        assert_eq!(outcome, StubOutcome::NotFound);
    }
}
