//! SELF container codec for PS5 signed binaries.
//!
//! Segment payloads inside a real signed container are encrypted and this
//! crate does not attempt to decrypt them; [`external::ExternalDecrypter`]
//! delegates that to an external tool. What this crate owns outright is
//! detection ([`detect`]) and the fake-sign re-wrap ([`rewrap`]) that turns
//! a plain ELF back into a container accepted by exploited firmware.

mod consts;
mod detect;
mod external;
mod rewrap;

pub use detect::{find_embedded_elf_offset, is_self_file};
pub use external::{find_decrypter, ExternalDecrypter};
pub use rewrap::{fake_sign, FakeSignOptions};
