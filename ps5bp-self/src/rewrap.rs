use scroll::{Pread, LE};
use sha2::{Digest, Sha256};

use ps5bp_common::{Error, Result};

use crate::consts::*;

/// Parameters governing the ExInfo block of a rewrapped SELF.
#[derive(Debug, Clone, Copy)]
pub struct FakeSignOptions {
    pub paid: u64,
    pub ptype: u64,
    pub app_version: u64,
    pub fw_version: u64,
}

impl Default for FakeSignOptions {
    fn default() -> Self {
        FakeSignOptions {
            paid: DEFAULT_PAID,
            ptype: PTYPE_FAKE,
            app_version: 0,
            fw_version: 0,
        }
    }
}

struct ProgramHeader {
    p_type: u32,
    p_flags: u32,
    p_offset: u64,
    p_vaddr: u64,
    p_paddr: u64,
    p_filesz: u64,
    p_memsz: u64,
    p_align: u64,
}

impl ProgramHeader {
    fn read(data: &[u8], offset: usize) -> Result<Self> {
        let bad = || Error::malformed("truncated program header");
        Ok(ProgramHeader {
            p_type: data.pread_with::<u32>(offset, LE).map_err(|_| bad())?,
            p_flags: data.pread_with::<u32>(offset + 4, LE).map_err(|_| bad())?,
            p_offset: data.pread_with::<u64>(offset + 8, LE).map_err(|_| bad())?,
            p_vaddr: data.pread_with::<u64>(offset + 16, LE).map_err(|_| bad())?,
            p_paddr: data.pread_with::<u64>(offset + 24, LE).map_err(|_| bad())?,
            p_filesz: data.pread_with::<u64>(offset + 32, LE).map_err(|_| bad())?,
            p_memsz: data.pread_with::<u64>(offset + 40, LE).map_err(|_| bad())?,
            p_align: data.pread_with::<u64>(offset + 48, LE).map_err(|_| bad())?,
        })
    }

    fn to_bytes(&self) -> [u8; ELF_PHDR_SIZE] {
        let mut buf = [0u8; ELF_PHDR_SIZE];
        buf[0..4].copy_from_slice(&self.p_type.to_le_bytes());
        buf[4..8].copy_from_slice(&self.p_flags.to_le_bytes());
        buf[8..16].copy_from_slice(&self.p_offset.to_le_bytes());
        buf[16..24].copy_from_slice(&self.p_vaddr.to_le_bytes());
        buf[24..32].copy_from_slice(&self.p_paddr.to_le_bytes());
        buf[32..40].copy_from_slice(&self.p_filesz.to_le_bytes());
        buf[40..48].copy_from_slice(&self.p_memsz.to_le_bytes());
        buf[48..56].copy_from_slice(&self.p_align.to_le_bytes());
        buf
    }
}

struct ElfHeader {
    ident: [u8; 16],
    e_type: u16,
    e_machine: u16,
    e_version: u32,
    e_entry: u64,
    e_phoff: u64,
    e_shoff: u64,
    e_flags: u32,
    e_ehsize: u16,
    e_phentsize: u16,
    e_phnum: u16,
    e_shentsize: u16,
    e_shstrndx: u16,
}

impl ElfHeader {
    fn read(data: &[u8]) -> Result<Self> {
        if data.len() < ELF_EHDR_SIZE || data[0..4] != [0x7F, b'E', b'L', b'F'] {
            return Err(Error::malformed("not a valid ELF file"));
        }
        if data[4] != 2 {
            return Err(Error::malformed("not a 64-bit ELF"));
        }
        if data[5] != 1 {
            return Err(Error::malformed("not a little-endian ELF"));
        }
        let bad = || Error::malformed("truncated ELF header");
        let mut ident = [0u8; 16];
        ident.copy_from_slice(&data[0..16]);
        Ok(ElfHeader {
            ident,
            e_type: data.pread_with(0x10, LE).map_err(|_| bad())?,
            e_machine: data.pread_with(0x12, LE).map_err(|_| bad())?,
            e_version: data.pread_with(0x14, LE).map_err(|_| bad())?,
            e_entry: data.pread_with(0x18, LE).map_err(|_| bad())?,
            e_phoff: data.pread_with(0x20, LE).map_err(|_| bad())?,
            e_shoff: data.pread_with(0x28, LE).map_err(|_| bad())?,
            e_flags: data.pread_with(0x30, LE).map_err(|_| bad())?,
            e_ehsize: data.pread_with(0x34, LE).map_err(|_| bad())?,
            e_phentsize: data.pread_with(0x36, LE).map_err(|_| bad())?,
            e_phnum: data.pread_with(0x38, LE).map_err(|_| bad())?,
            e_shentsize: data.pread_with(0x3A, LE).map_err(|_| bad())?,
            e_shstrndx: data.pread_with(0x3E, LE).map_err(|_| bad())?,
        })
    }
}

fn align_up(value: u64, alignment: u64) -> u64 {
    (value + alignment - 1) & !(alignment - 1)
}

struct SelfEntry {
    props: u64,
    offset: u64,
    filesz: u64,
    memsz: u64,
    data: Vec<u8>,
}

/// Wraps a plain 64-bit ELF byte buffer into a fake-signed SELF container
/// accepted by exploited PS5 firmware. See the container layout plan.
pub fn fake_sign(elf_data: &[u8], opts: &FakeSignOptions) -> Result<Vec<u8>> {
    let digest: [u8; DIGEST_SIZE] = Sha256::digest(elf_data).into();

    let ehdr = ElfHeader::read(elf_data)?;
    let mut phdrs = Vec::with_capacity(ehdr.e_phnum as usize);
    let mut segments = Vec::with_capacity(ehdr.e_phnum as usize);
    let mut version_data: Option<Vec<u8>> = None;

    for i in 0..ehdr.e_phnum as usize {
        let off = ehdr.e_phoff as usize + i * ehdr.e_phentsize as usize;
        let ph = ProgramHeader::read(elf_data, off)?;
        let seg = if ph.p_filesz > 0 {
            let start = ph.p_offset as usize;
            let end = start + ph.p_filesz as usize;
            elf_data
                .get(start..end)
                .ok_or_else(|| Error::malformed("segment extends past end of file"))?
                .to_vec()
        } else {
            Vec::new()
        };
        if ph.p_type == PT_SCE_VERSION {
            version_data = Some(seg.clone());
        }
        segments.push(seg);
        phdrs.push(ph);
    }

    let mut entries = Vec::new();
    let mut entry_index: u64 = 0;
    let mut entry_phdr_idx = Vec::new();

    for (i, ph) in phdrs.iter().enumerate() {
        if !SELF_SEGMENT_TYPES.contains(&ph.p_type) {
            continue;
        }

        let mut meta_props: u64 = 0;
        meta_props |= 1 << 2; // signed
        meta_props |= 1 << 16; // has_digests
        meta_props |= ((entry_index + 1) & 0xFFFF) << 20; // segment_index
        entries.push(SelfEntry {
            props: meta_props,
            offset: 0,
            filesz: 0,
            memsz: 0,
            data: Vec::new(),
        });
        entry_phdr_idx.push((i, true));

        let mut data_props: u64 = 0;
        data_props |= 1 << 2; // signed
        data_props |= 1 << 11; // has_blocks
        let block_val = (BLOCK_SIZE.trailing_zeros() as u64) - 12; // ilog2(block_size) - 12
        data_props |= (block_val & 0xF) << 12;
        data_props |= ((i as u64) & 0xFFFF) << 20;
        entries.push(SelfEntry {
            props: data_props,
            offset: 0,
            filesz: 0,
            memsz: 0,
            data: Vec::new(),
        });
        entry_phdr_idx.push((i, false));

        entry_index += 2;
    }

    let num_entries = entries.len();
    let signed_block_count: u16 = 2;
    let flags: u16 = 0x2 | (signed_block_count << FLAGS_SEGMENT_SIGNED_SHIFT);

    let elf_headers_size = std::cmp::max(
        ehdr.e_ehsize as u64,
        ehdr.e_phoff + ehdr.e_phentsize as u64 * ehdr.e_phnum as u64,
    );

    let mut header_size = (COMMON_HEADER_SIZE
        + EXT_HEADER_SIZE
        + EXT_HEADER_PAD
        + num_entries * ENTRY_SIZE) as u64
        + elf_headers_size;
    header_size = align_up(header_size, 16);
    header_size += EXINFO_SIZE as u64;
    header_size += NPDRM_SIZE as u64;

    let meta_size =
        (num_entries * META_BLOCK_SIZE + META_FOOTER_SIZE + SIGNATURE_SIZE) as u64;

    let mut offset = header_size + meta_size;
    for (entry, &(phdr_idx, is_meta)) in entries.iter_mut().zip(entry_phdr_idx.iter()) {
        let ph = &phdrs[phdr_idx];
        if is_meta {
            let num_blocks = align_up(ph.p_filesz, BLOCK_SIZE) / BLOCK_SIZE;
            entry.data = vec![0u8; (num_blocks as usize) * DIGEST_SIZE];
        } else {
            entry.data = segments[phdr_idx].clone();
        }
        entry.offset = offset;
        entry.filesz = entry.data.len() as u64;
        entry.memsz = entry.filesz;
        offset = align_up(offset + entry.filesz, 16);
    }
    let file_size = offset;

    let mut out = Vec::with_capacity(file_size as usize + 16);

    out.extend_from_slice(&SELF_MAGIC_A);
    out.extend_from_slice(&[SELF_VERSION, SELF_MODE, SELF_ENDIAN, SELF_ATTRIBS]);

    out.extend_from_slice(&SELF_KEY_TYPE.to_le_bytes());
    out.extend_from_slice(&(header_size as u16).to_le_bytes());
    out.extend_from_slice(&(meta_size as u16).to_le_bytes());
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&(num_entries as u16).to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);

    for entry in &entries {
        out.extend_from_slice(&entry.props.to_le_bytes());
        out.extend_from_slice(&entry.offset.to_le_bytes());
        out.extend_from_slice(&entry.filesz.to_le_bytes());
        out.extend_from_slice(&entry.memsz.to_le_bytes());
    }

    out.extend_from_slice(&ehdr.ident);
    out.extend_from_slice(&ehdr.e_type.to_le_bytes());
    out.extend_from_slice(&ehdr.e_machine.to_le_bytes());
    out.extend_from_slice(&ehdr.e_version.to_le_bytes());
    out.extend_from_slice(&ehdr.e_entry.to_le_bytes());
    out.extend_from_slice(&ehdr.e_phoff.to_le_bytes());
    out.extend_from_slice(&ehdr.e_shoff.to_le_bytes());
    out.extend_from_slice(&ehdr.e_flags.to_le_bytes());
    out.extend_from_slice(&ehdr.e_ehsize.to_le_bytes());
    out.extend_from_slice(&ehdr.e_phentsize.to_le_bytes());
    out.extend_from_slice(&ehdr.e_phnum.to_le_bytes());
    out.extend_from_slice(&ehdr.e_shentsize.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // e_shnum forced to zero
    out.extend_from_slice(&ehdr.e_shstrndx.to_le_bytes());

    for ph in &phdrs {
        out.extend_from_slice(&ph.to_bytes());
    }

    let elf_headers_aligned = align_up(elf_headers_size, 16) as usize;
    let post_elf_headers =
        COMMON_HEADER_SIZE + EXT_HEADER_SIZE + EXT_HEADER_PAD + num_entries * ENTRY_SIZE
            + elf_headers_aligned;
    out.resize(post_elf_headers, 0);

    out.extend_from_slice(&opts.paid.to_le_bytes());
    out.extend_from_slice(&opts.ptype.to_le_bytes());
    out.extend_from_slice(&opts.app_version.to_le_bytes());
    out.extend_from_slice(&opts.fw_version.to_le_bytes());
    out.extend_from_slice(&digest);

    out.extend_from_slice(&0x3u16.to_le_bytes()); // NPDRM type
    out.extend_from_slice(&[0u8; 14]);
    out.extend_from_slice(&[0u8; 19]); // empty content id
    out.extend_from_slice(&[0u8; 13]);

    for _ in &entries {
        out.extend_from_slice(&[0u8; META_BLOCK_SIZE]);
    }

    out.extend_from_slice(&[0u8; 48]);
    out.extend_from_slice(&0x1_0000u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 28]);

    out.extend_from_slice(&[0u8; SIGNATURE_SIZE]);

    for entry in &entries {
        let start = entry.offset as usize;
        let end = start + entry.data.len();
        if out.len() < end {
            out.resize(end, 0);
        }
        out[start..end].copy_from_slice(&entry.data);
    }

    if out.len() < file_size as usize {
        out.resize(file_size as usize, 0);
    }

    if let Some(version_data) = version_data {
        if !version_data.is_empty() {
            out.extend_from_slice(&version_data);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_elf() -> Vec<u8> {
        let mut buf = vec![0u8; ELF_EHDR_SIZE + ELF_PHDR_SIZE];
        buf[0..4].copy_from_slice(&[0x7F, b'E', b'L', b'F']);
        buf[4] = 2;
        buf[5] = 1;
        buf[0x10..0x12].copy_from_slice(&2u16.to_le_bytes()); // e_type
        buf[0x34..0x36].copy_from_slice(&(ELF_EHDR_SIZE as u16).to_le_bytes());
        buf[0x20..0x28].copy_from_slice(&(ELF_EHDR_SIZE as u64).to_le_bytes()); // e_phoff
        buf[0x36..0x38].copy_from_slice(&(ELF_PHDR_SIZE as u16).to_le_bytes());
        buf[0x38..0x3A].copy_from_slice(&1u16.to_le_bytes()); // e_phnum = 1

        let ph_off = ELF_EHDR_SIZE;
        buf[ph_off..ph_off + 4].copy_from_slice(&PT_LOAD.to_le_bytes());
        // p_filesz / p_memsz left at zero: an empty LOAD segment.
        buf
    }

    #[test]
    fn fake_sign_produces_self_magic_and_digest() {
        let elf = minimal_elf();
        let opts = FakeSignOptions::default();
        let out = fake_sign(&elf, &opts).unwrap();
        assert_eq!(&out[0..4], &SELF_MAGIC_A);

        let digest = Sha256::digest(&elf);
        // The ExInfo block sits right before the 48-byte NPDRM block, which
        // in turn sits right before the meta blocks; locate it by scanning
        // for the digest bytes rather than recomputing every offset here.
        let found = out.windows(32).any(|w| w == digest.as_slice());
        assert!(found, "sha256 digest not found in output");
    }

    #[test]
    fn rejects_non_elf() {
        let data = vec![0u8; 64];
        assert!(fake_sign(&data, &FakeSignOptions::default()).is_err());
    }
}
