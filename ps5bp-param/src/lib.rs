mod binary;
mod oob;
mod sdk_map;

pub use binary::{patch_sdk_words, PatchOutcome};
pub use oob::{patch_param_json, patch_param_sfo};
pub use sdk_map::sdk_words_for;
