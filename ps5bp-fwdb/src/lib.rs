//! Firmware knowledge base for the PS5 backport toolkit.
//!
//! Two complementary sources of symbol knowledge live here: a curated
//! static database ([`static_db`]) classifying well-known functions by
//! name, with prefix/suffix heuristics for everything else, and a
//! JSON-backed per-firmware exports database ([`exports`]) built from real
//! firmware library dumps. [`fakelib`] tracks which replacement libraries
//! are available for which target firmware.

mod exports;
mod fakelib;
mod static_db;
mod types;

pub use exports::{ExportsDb, FirmwareExports};
pub use fakelib::{requires_fakelib, FakelibAvailability, FAKELIB_REQUIRED};
pub use static_db::{guess_category, StaticKnowledgeBase};
pub use types::{Category, Classification, ClassificationSource, LibraryInfo, StaticSymbolInfo};
