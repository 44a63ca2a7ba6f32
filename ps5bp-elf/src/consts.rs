//! Raw structural constants for 64-bit ELF and the PS5 (SCE) extensions.

pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
pub const ELFCLASS64: u8 = 2;

pub const PT_LOAD: u32 = 0x1;
pub const PT_DYNAMIC: u32 = 0x2;
pub const PT_SCE_DYNLIBDATA: u32 = 0x6100_0000;
pub const PT_SCE_PROCPARAM: u32 = 0x6100_0001;
pub const PT_SCE_MODULE_PARAM: u32 = 0x6100_0002;
pub const PT_SCE_RELRO: u32 = 0x6100_0010;
pub const PT_SCE_COMMENT: u32 = 0x6FFF_FF00;
pub const PT_SCE_VERSION: u32 = 0x6FFF_FF01;

pub const PF_X: u32 = 0x1;

/// Standard dynamic tags.
pub const DT_NULL: i64 = 0;
pub const DT_NEEDED: i64 = 1;
pub const DT_STRTAB: i64 = 5;
pub const DT_SYMTAB: i64 = 6;
pub const DT_STRSZ: i64 = 10;
pub const DT_SYMENT: i64 = 11;
pub const DT_PLTGOT: i64 = 3;
pub const DT_PLTRELSZ: i64 = 2;
pub const DT_PLTREL: i64 = 20;
pub const DT_JMPREL: i64 = 23;

/// SCE-prefixed variants, tried as a fallback whenever the standard tag is
/// absent; PS5 binaries frequently carry only one of the two families.
pub const DT_SCE_NEEDED: i64 = 0x6100_000D;
pub const DT_SCE_MODULE_INFO: i64 = 0x6100_000E;
pub const DT_SCE_SYMTAB: i64 = 0x6100_0011;
pub const DT_SCE_STRTAB: i64 = 0x6100_0013;
pub const DT_SCE_STRSZ: i64 = 0x6100_0015;
pub const DT_SCE_HASH: i64 = 0x6100_0019;
pub const DT_SCE_SYMTABSZ: i64 = 0x6100_0025;
pub const DT_SCE_RELA: i64 = 0x6100_0035;
pub const DT_SCE_RELASZ: i64 = 0x6100_0037;
pub const DT_SCE_RELAENT: i64 = 0x6100_0039;
pub const DT_SCE_PLTGOT: i64 = 0x6100_003B;
pub const DT_SCE_PLTRELSZ: i64 = 0x6100_003D;
pub const DT_SCE_PLTREL: i64 = 0x6100_003F;
pub const DT_SCE_JMPREL: i64 = 0x6100_0041;
pub const DT_SCE_ORIGINAL_FILENAME: i64 = 0x6100_0007;

pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;
pub const STB_WEAK: u8 = 2;

pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;

pub const SHN_UNDEF: u16 = 0;

pub const SCE_PROCESS_PARAM_MAGIC: u32 = 0x4942_524F; // "IBRO"
pub const SCE_MODULE_PARAM_MAGIC: u32 = 0x3C13_F4BF;

pub const SCE_PARAM_MAGIC_OFFSET: usize = 0x08;
pub const SCE_PARAM_PLATFORM_A_SDK_OFFSET: usize = 0x10;
pub const SCE_PARAM_PLATFORM_B_SDK_OFFSET: usize = 0x14;

pub const ELF_EHDR_SIZE: usize = 0x40;
pub const ELF_PHDR_SIZE: usize = 0x38;
pub const ELF_SYM_SIZE: usize = 24;
pub const ELF_RELA_SIZE: usize = 24;
