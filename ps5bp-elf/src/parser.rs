use ps5bp_common::{Arch, Error, Result};
use scroll::{Pread, LE};

use crate::consts::*;
use crate::types::{
    ElfInfo, EncodedImportName, ParamSegment, PltRelocation, Segment, Symbol, SymbolBinding,
    SymbolKind,
};

/// Reads a little-endian integer at `offset`, mapping any out-of-bounds or
/// context error to a [`Error::MalformedInput`].
macro_rules! pread {
    ($data:expr, $ty:ty, $offset:expr) => {
        Pread::pread_with::<$ty>($data, $offset, LE)
            .map_err(|_: scroll::Error| Error::malformed("truncated ELF structure"))
    };
}

#[derive(Debug, Default)]
struct DynamicTags {
    raw: Vec<(i64, u64)>,
}

impl DynamicTags {
    /// Looks up the standard tag first, falling back to the SCE-prefixed
    /// variant. Either family alone is sufficient to resolve a field.
    fn get(&self, standard: i64, sce: i64) -> Option<u64> {
        self.raw
            .iter()
            .find(|(tag, _)| *tag == standard)
            .or_else(|| self.raw.iter().find(|(tag, _)| *tag == sce))
            .map(|(_, val)| *val)
    }

    fn needed_offsets(&self) -> Vec<u64> {
        self.raw
            .iter()
            .filter(|(tag, _)| *tag == DT_NEEDED || *tag == DT_SCE_NEEDED)
            .map(|(_, val)| *val)
            .collect()
    }
}

/// Parses a plain (decrypted) 64-bit ELF from its program headers and
/// dynamic segment alone; no section headers are consulted (`e_shnum` may
/// legitimately be zero on stripped PS5 binaries).
pub fn parse(data: &[u8]) -> Result<ElfInfo> {
    if data.len() < ELF_EHDR_SIZE || data[0..4] != ELF_MAGIC {
        return Err(Error::malformed("missing ELF magic"));
    }
    if data[4] != ELFCLASS64 {
        return Err(Error::malformed("only 64-bit (ELFCLASS64) ELF is supported"));
    }

    let e_type: u16 = pread!(data, u16, 16)?;
    let e_machine: u16 = pread!(data, u16, 18)?;
    let e_phoff: u64 = pread!(data, u64, 32)?;
    let e_phentsize: u16 = pread!(data, u16, 54)?;
    let e_phnum: u16 = pread!(data, u16, 56)?;

    if e_phentsize == 0 {
        return Err(Error::malformed("zero program header entry size"));
    }

    let arch = Arch::from_e_machine(e_machine);

    let mut loadable_segments = Vec::new();
    let mut executable_segments = Vec::new();
    let mut dynamic_segment = None;
    let mut param_segment_raw: Option<(u32, Segment)> = None;

    for i in 0..e_phnum as usize {
        let off = e_phoff as usize + i * e_phentsize as usize;
        if off + ELF_PHDR_SIZE > data.len() {
            break;
        }
        let p_type: u32 = pread!(data, u32, off)?;
        let p_flags: u32 = pread!(data, u32, off + 4)?;
        let p_offset: u64 = pread!(data, u64, off + 8)?;
        let p_vaddr: u64 = pread!(data, u64, off + 16)?;
        let p_filesz: u64 = pread!(data, u64, off + 32)?;
        let p_memsz: u64 = pread!(data, u64, off + 40)?;

        let segment = Segment {
            p_type,
            file_offset: p_offset,
            virtual_address: p_vaddr,
            file_size: p_filesz,
            memory_size: p_memsz,
            is_executable: p_flags & PF_X != 0,
        };

        match p_type {
            PT_LOAD => {
                loadable_segments.push(segment);
                if segment.is_executable {
                    executable_segments.push(segment);
                }
            }
            PT_DYNAMIC => dynamic_segment = Some(segment),
            PT_SCE_PROCPARAM | PT_SCE_MODULE_PARAM => {
                param_segment_raw = Some((p_type, segment))
            }
            _ => {}
        }
    }

    let dyn_tags = match dynamic_segment {
        Some(seg) => parse_dynamic(data, &seg)?,
        None => DynamicTags::default(),
    };

    let strtab = resolve_strtab(data, &loadable_segments, &dyn_tags);
    let needed_libraries = dyn_tags
        .needed_offsets()
        .into_iter()
        .filter_map(|off| strtab.as_deref().and_then(|s| read_cstr(s, off as usize)))
        .collect();

    let symbols = parse_symbols(data, &loadable_segments, &dyn_tags, strtab.as_deref())?;
    let plt_relocations = parse_jmprel(data, &loadable_segments, &dyn_tags)?;
    let param_segment = param_segment_raw
        .and_then(|(kind, seg)| decode_param_segment(data, kind, &seg));

    Ok(ElfInfo {
        arch,
        e_type,
        loadable_segments,
        executable_segments,
        needed_libraries,
        symbols,
        plt_relocations,
        param_segment,
    })
}

fn parse_dynamic(data: &[u8], segment: &Segment) -> Result<DynamicTags> {
    let mut raw = Vec::new();
    let base = segment.file_offset as usize;
    let mut i = 0usize;
    loop {
        let off = base + i * 16;
        if off + 16 > data.len() {
            break;
        }
        let tag: i64 = pread!(data, i64, off)?;
        let val: u64 = pread!(data, u64, off + 8)?;
        if tag == DT_NULL {
            break;
        }
        raw.push((tag, val));
        i += 1;
        if i > 4096 {
            // Malformed dynamic segment without a DT_NULL sentinel; bail
            // out cleanly rather than spin.
            break;
        }
    }
    Ok(DynamicTags { raw })
}

/// Translates a virtual address to a file offset using the loadable segment
/// map built during the program-header walk.
fn vaddr_to_offset(segments: &[Segment], vaddr: u64) -> Option<u64> {
    segments.iter().find_map(|s| s.vaddr_to_offset(vaddr))
}

fn resolve_strtab(data: &[u8], segments: &[Segment], tags: &DynamicTags) -> Option<Vec<u8>> {
    let strtab_vaddr = tags.get(DT_STRTAB, DT_SCE_STRTAB)?;
    let strsz = tags.get(DT_STRSZ, DT_SCE_STRSZ)? as usize;
    let offset = vaddr_to_offset(segments, strtab_vaddr)? as usize;
    if offset + strsz > data.len() {
        return None;
    }
    Some(data[offset..offset + strsz].to_vec())
}

fn read_cstr(buf: &[u8], offset: usize) -> Option<String> {
    if offset >= buf.len() {
        return None;
    }
    let end = buf[offset..].iter().position(|&b| b == 0)? + offset;
    std::str::from_utf8(&buf[offset..end]).ok().map(String::from)
}

fn parse_symbols(
    data: &[u8],
    segments: &[Segment],
    tags: &DynamicTags,
    strtab: Option<&[u8]>,
) -> Result<Vec<Symbol>> {
    let Some(symtab_vaddr) = tags.get(DT_SYMTAB, DT_SCE_SYMTAB) else {
        return Ok(Vec::new());
    };
    let Some(strtab) = strtab else {
        return Ok(Vec::new());
    };
    let Some(base_offset) = vaddr_to_offset(segments, symtab_vaddr) else {
        return Ok(Vec::new());
    };
    let syment = tags.get(DT_SYMENT, DT_SCE_SYMTAB).map(|_| ELF_SYM_SIZE).unwrap_or(ELF_SYM_SIZE);

    // The symbol table has no explicit count on stripped PS5 binaries; we
    // walk until the string-table-bounded name offset or section index
    // looks implausible, or we run off the end of the buffer. Index 0 is
    // the reserved null symbol.
    let base_offset = base_offset as usize;
    let mut symbols = Vec::new();
    let mut index = 1usize;
    loop {
        let off = base_offset + index * syment;
        if off + ELF_SYM_SIZE > data.len() {
            break;
        }
        let st_name: u32 = pread!(data, u32, off)?;
        let st_info: u8 = data[off + 4];
        let st_shndx: u16 = pread!(data, u16, off + 6)?;
        let st_value: u64 = pread!(data, u64, off + 8)?;
        let st_size: u64 = pread!(data, u64, off + 16)?;

        if st_name as usize >= strtab.len() && st_name != 0 {
            break;
        }

        let name = read_cstr(strtab, st_name as usize).unwrap_or_default();
        if name.is_empty() && st_name == 0 && st_value == 0 && st_size == 0 && st_shndx == 0 {
            // Looks like padding/end-of-table; stop rather than emit noise.
            if index > 1 {
                break;
            }
        }

        let binding = match st_info >> 4 {
            STB_LOCAL => SymbolBinding::Local,
            STB_GLOBAL => SymbolBinding::Global,
            STB_WEAK => SymbolBinding::Weak,
            other => SymbolBinding::Other(other),
        };
        let kind = match st_info & 0xF {
            STT_OBJECT => SymbolKind::Object,
            STT_FUNC => SymbolKind::Function,
            other => SymbolKind::Other(other),
        };

        symbols.push(Symbol {
            name,
            binding,
            kind,
            section_index: st_shndx,
            value: st_value,
            size: st_size,
        });

        index += 1;
        // Stripped PS5 binaries don't carry a symbol count; the jmprel /
        // hash tables bound the real count but we cap defensively here so a
        // corrupt or adversarial file can't make this loop unbounded.
        if index > 200_000 {
            break;
        }
    }
    Ok(symbols)
}

fn parse_jmprel(
    data: &[u8],
    segments: &[Segment],
    tags: &DynamicTags,
) -> Result<Vec<PltRelocation>> {
    let Some(jmprel_vaddr) = tags.get(DT_JMPREL, DT_SCE_JMPREL) else {
        return Ok(Vec::new());
    };
    let Some(pltrelsz) = tags.get(DT_PLTRELSZ, DT_SCE_PLTRELSZ) else {
        return Ok(Vec::new());
    };
    let Some(base_offset) = vaddr_to_offset(segments, jmprel_vaddr) else {
        return Ok(Vec::new());
    };

    let base_offset = base_offset as usize;
    let count = pltrelsz as usize / ELF_RELA_SIZE;
    let mut relocations = Vec::with_capacity(count);
    for i in 0..count {
        let off = base_offset + i * ELF_RELA_SIZE;
        if off + ELF_RELA_SIZE > data.len() {
            break;
        }
        let r_offset: u64 = pread!(data, u64, off)?;
        let r_info: u64 = pread!(data, u64, off + 8)?;
        let r_addend: i64 = pread!(data, i64, off + 16)?;
        relocations.push(PltRelocation {
            got_vaddr: r_offset,
            symbol_index: (r_info >> 32) as u32,
            relocation_kind: (r_info & 0xFFFF_FFFF) as u32,
            addend: r_addend,
        });
    }
    Ok(relocations)
}

fn decode_param_segment(data: &[u8], kind: u32, segment: &Segment) -> Option<ParamSegment> {
    let base = segment.file_offset as usize;
    if segment.file_size < 0x18 || base + SCE_PARAM_PLATFORM_B_SDK_OFFSET + 4 > data.len() {
        return None;
    }
    let magic: u32 = pread!(data, u32, base + SCE_PARAM_MAGIC_OFFSET).ok()?;
    let expected = match kind {
        PT_SCE_PROCPARAM => SCE_PROCESS_PARAM_MAGIC,
        PT_SCE_MODULE_PARAM => SCE_MODULE_PARAM_MAGIC,
        _ => return None,
    };
    if magic != expected {
        return None;
    }
    let platform_a_sdk: u32 = pread!(data, u32, base + SCE_PARAM_PLATFORM_A_SDK_OFFSET).ok()?;
    let platform_b_sdk: u32 = pread!(data, u32, base + SCE_PARAM_PLATFORM_B_SDK_OFFSET).ok()?;
    Some(ParamSegment {
        segment_type: kind,
        file_offset: segment.file_offset,
        platform_a_sdk_offset: (base + SCE_PARAM_PLATFORM_A_SDK_OFFSET) as u64,
        platform_b_sdk_offset: (base + SCE_PARAM_PLATFORM_B_SDK_OFFSET) as u64,
        platform_a_sdk,
        platform_b_sdk,
    })
}

/// Parses the encoded `"NID#LIB#MODULE"` form of an imported symbol's name.
pub fn decode_import_name(name: &str) -> Option<EncodedImportName> {
    EncodedImportName::parse(name)
}

/// Lists `(name, nid)` pairs for every globally-visible exported function in
/// a real firmware library, for use by a builder pipeline populating the
/// exports-by-firmware-version database from a folder of extracted `.sprx`
/// files. Exported symbol *names* on real firmware libraries are not
/// NID-encoded (only imports are); the NID is derived from the name via
/// [`ps5bp_common::compute_nid`] instead of being read off the symbol.
pub fn parse_exports(data: &[u8]) -> Result<Vec<crate::types::ExportedNid>> {
    let info = parse(data)?;
    Ok(info
        .exported_symbols()
        .filter(|s| matches!(s.kind, SymbolKind::Function))
        .map(|s| crate::types::ExportedNid {
            nid: ps5bp_common::compute_nid(&s.name),
            name: s.name.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_ehdr(e_machine: u16, e_phnum: u16) -> Vec<u8> {
        let mut buf = vec![0u8; ELF_EHDR_SIZE];
        buf[0..4].copy_from_slice(&ELF_MAGIC);
        buf[4] = ELFCLASS64;
        buf[16..18].copy_from_slice(&1u16.to_le_bytes()); // e_type
        buf[18..20].copy_from_slice(&e_machine.to_le_bytes());
        buf[32..40].copy_from_slice(&(ELF_EHDR_SIZE as u64).to_le_bytes()); // e_phoff
        buf[54..56].copy_from_slice(&(ELF_PHDR_SIZE as u16).to_le_bytes());
        buf[56..58].copy_from_slice(&e_phnum.to_le_bytes());
        buf
    }

    #[test]
    fn rejects_non_elf() {
        let data = vec![0u8; 64];
        assert!(parse(&data).is_err());
    }

    #[test]
    fn parses_empty_program_header_table() {
        let data = minimal_ehdr(EM_X86_64, 0);
        let info = parse(&data).unwrap();
        assert_eq!(info.arch, Arch::X86_64);
        assert!(info.loadable_segments.is_empty());
        assert!(info.needed_libraries.is_empty());
    }

    #[test]
    fn decodes_encoded_import_name() {
        let decoded = decode_import_name("A4A8B1D0FBF1CA52#libkernel#libkernel").unwrap();
        assert_eq!(decoded.nid, "A4A8B1D0FBF1CA52");
        assert_eq!(decoded.library_suffix, "libkernel");
        assert_eq!(decoded.module_suffix, "libkernel");
    }
}
