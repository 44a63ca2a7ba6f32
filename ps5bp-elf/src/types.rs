use ps5bp_common::Arch;

/// A loadable or otherwise interesting program-header-described segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub p_type: u32,
    pub file_offset: u64,
    pub virtual_address: u64,
    pub file_size: u64,
    pub memory_size: u64,
    pub is_executable: bool,
}

impl Segment {
    /// Translates a virtual address falling within this segment to a file
    /// offset. Returns `None` if `vaddr` is outside the segment's mapped range.
    pub fn vaddr_to_offset(&self, vaddr: u64) -> Option<u64> {
        if vaddr >= self.virtual_address && vaddr < self.virtual_address + self.memory_size {
            Some(self.file_offset + (vaddr - self.virtual_address))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Object,
    Function,
    Other(u8),
}

/// A single `Elf64_Sym` entry, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub binding: SymbolBinding,
    pub kind: SymbolKind,
    pub section_index: u16,
    pub value: u64,
    pub size: u64,
}

impl Symbol {
    pub fn is_imported(&self) -> bool {
        self.section_index == 0 && !self.name.is_empty()
    }

    pub fn is_exported(&self) -> bool {
        self.section_index != 0
            && matches!(self.binding, SymbolBinding::Global | SymbolBinding::Weak)
            && matches!(self.kind, SymbolKind::Function | SymbolKind::Object)
    }
}

/// The three components of an encoded import name, `"NID#LIB#MODULE"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImportName {
    pub nid: String,
    pub library_suffix: String,
    pub module_suffix: String,
}

impl EncodedImportName {
    /// Splits a raw imported-symbol name on `#`. Symbols that don't follow
    /// the `NID#LIB#MODULE` convention (e.g. weak libc imports) yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, '#');
        let nid = parts.next()?.to_string();
        let library_suffix = parts.next()?.to_string();
        let module_suffix = parts.next().unwrap_or_default().to_string();
        Some(EncodedImportName {
            nid,
            library_suffix,
            module_suffix,
        })
    }
}

/// A single PLT relocation (`Elf64_Rela` entry from the JMPREL table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PltRelocation {
    pub got_vaddr: u64,
    pub symbol_index: u32,
    pub relocation_kind: u32,
    pub addend: i64,
}

/// The decoded PS5 process/module parameter segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSegment {
    pub segment_type: u32,
    pub file_offset: u64,
    pub platform_a_sdk_offset: u64,
    pub platform_b_sdk_offset: u64,
    pub platform_a_sdk: u32,
    pub platform_b_sdk: u32,
}

/// Full parse result for one ELF image.
#[derive(Debug, Clone)]
pub struct ElfInfo {
    pub arch: Arch,
    pub e_type: u16,
    pub loadable_segments: Vec<Segment>,
    pub executable_segments: Vec<Segment>,
    pub needed_libraries: Vec<String>,
    pub symbols: Vec<Symbol>,
    pub plt_relocations: Vec<PltRelocation>,
    pub param_segment: Option<ParamSegment>,
}

impl ElfInfo {
    pub fn imported_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_imported())
    }

    pub fn exported_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_exported())
    }
}

/// A resolved `(name, nid)` export, used by builder pipelines that scan a
/// folder of real firmware libraries to populate the exports database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedNid {
    pub name: String,
    pub nid: String,
}
