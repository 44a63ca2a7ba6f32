//! PLT stubber.
//!
//! Builds a one-time map from GOT virtual address to PLT slot file offset
//! by scanning executable segments for `FF 25` RIP-relative jumps
//! ([`scan::PltAddressMap`]), then overwrites selected slots with
//! architecture-correct instruction sequences ([`palette`]) via
//! [`stubber::Stubber`].

mod palette;
mod scan;
mod stubber;

pub use palette::{palette_entry, StubBytes};
pub use scan::PltAddressMap;
pub use stubber::{StubOutcome, Stubber};
