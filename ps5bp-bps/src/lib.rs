//! BPS binary delta applier.
//!
//! [`vlc`] implements the format's variable-length integer coding and
//! zig-zag signed deltas; [`format`] parses the `BPS1` header/footer;
//! [`apply`] runs the four-action decode loop with full CRC-32
//! verification. [`db`] is a thin JSON-backed lookup for locating the
//! right patch file for a given firmware pair and library.

mod apply;
mod db;
mod format;
mod vlc;

pub use apply::{apply_patch, validate_patch};
pub use db::{PatchDatabase, PatchRecord};
pub use format::{parse_footer, parse_header, BpsFooter, BpsHeader};
pub use vlc::{decode_signed, encode_signed, read_vlc, write_vlc};
