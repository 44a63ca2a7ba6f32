//! Common types shared across the PS5 firmware backport toolkit.
//!
//! This crate carries no pipeline logic of its own; it exposes the vocabulary
//! every other crate in the workspace builds on:
//!
//!  - [`Arch`]: architecture tag derived from `e_machine`.
//!  - [`FirmwareVersion`]: ordered firmware version and gap classification.
//!  - [`compute_nid`]: the platform's symbol-name hashing scheme.
//!  - [`StubRisk`] / [`StubMode`]: the risk and replacement-instruction
//!    vocabulary shared by the firmware knowledge base, the compatibility
//!    analyzer, and the PLT stubber.
//!  - [`Error`]: the crate-wide error taxonomy.

mod arch;
mod error;
mod firmware;
mod nid;
mod risk;

pub use arch::{Arch, EM_AARCH64, EM_X86_64};
pub use error::{Error, Result};
pub use firmware::{firmware_gap, firmware_gap_level, FirmwareGapLevel, FirmwareVersion};
pub use nid::compute_nid;
pub use risk::{StubMode, StubRisk};
