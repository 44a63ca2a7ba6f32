//! Raw 64-bit ELF inspection for stripped PS5 binaries.
//!
//! Parsing here never consults section headers; stripped PS5 `.sprx` and
//! `.elf` payloads routinely carry `e_shnum == 0`. It understands the
//! SCE-prefixed dynamic tag family (`0x6100xxxx`) as a fallback wherever the
//! standard ELF tag is absent.

mod consts;
mod parser;
mod types;

pub use parser::{decode_import_name, parse, parse_exports};
pub use types::{
    ElfInfo, EncodedImportName, ExportedNid, ParamSegment, PltRelocation, Segment, Symbol,
    SymbolBinding, SymbolKind,
};
