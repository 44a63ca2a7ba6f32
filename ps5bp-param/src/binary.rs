use ps5bp_common::{Error, Result};
use ps5bp_elf::ParamSegment;

use crate::sdk_map::sdk_words_for;

/// Outcome of attempting to patch one parameter segment's SDK words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    AlreadyCurrent,
    SentinelZero,
    UnknownTarget,
}

/// Rewrites the platform-A/platform-B SDK version words inside `data` at
/// the offsets recorded in `segment`, targeting `fw_version`.
///
/// Each word is gated independently: a word is rewritten only if it is
/// non-zero (the zero sentinel means "not present" and is never touched)
/// and does not already match the target. Idempotent: running twice with
/// the same target produces the same bytes.
pub fn patch_sdk_words(data: &mut [u8], segment: &ParamSegment, fw_version: &str) -> Result<PatchOutcome> {
    let Some((platform_b_target, platform_a_target)) = sdk_words_for(fw_version) else {
        return Ok(PatchOutcome::UnknownTarget);
    };

    let mut patched = false;

    if segment.platform_a_sdk != 0 && segment.platform_a_sdk != platform_a_target {
        write_word(data, segment.platform_a_sdk_offset, platform_a_target)?;
        patched = true;
    }

    if segment.platform_b_sdk != 0 && segment.platform_b_sdk != platform_b_target {
        write_word(data, segment.platform_b_sdk_offset, platform_b_target)?;
        patched = true;
    }

    if patched {
        return Ok(PatchOutcome::Patched);
    }

    if segment.platform_a_sdk == 0 && segment.platform_b_sdk == 0 {
        Ok(PatchOutcome::SentinelZero)
    } else {
        Ok(PatchOutcome::AlreadyCurrent)
    }
}

fn write_word(data: &mut [u8], offset: u64, value: u32) -> Result<()> {
    let start = offset as usize;
    let end = start + 4;
    if end > data.len() {
        return Err(Error::malformed("param segment SDK word offset out of bounds"));
    }
    data[start..end].copy_from_slice(&value.to_le_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(platform_a: u32, platform_b: u32) -> (Vec<u8>, ParamSegment) {
        let mut data = vec![0u8; 32];
        data[16..20].copy_from_slice(&platform_a.to_le_bytes());
        data[20..24].copy_from_slice(&platform_b.to_le_bytes());
        let segment = ParamSegment {
            segment_type: 0x61000001,
            file_offset: 0,
            platform_a_sdk_offset: 16,
            platform_b_sdk_offset: 20,
            platform_a_sdk: platform_a,
            platform_b_sdk: platform_b,
        };
        (data, segment)
    }

    #[test]
    fn patches_when_stale() {
        let (mut data, segment) = segment(0x05508001, 0x01000001);
        let outcome = patch_sdk_words(&mut data, &segment, "7.00").unwrap();
        assert_eq!(outcome, PatchOutcome::Patched);
        assert_eq!(u32::from_le_bytes(data[16..20].try_into().unwrap()), 0x09508001);
        assert_eq!(u32::from_le_bytes(data[20..24].try_into().unwrap()), 0x07000001);
    }

    #[test]
    fn idempotent_on_second_run() {
        let (mut data, mut segment) = segment(0x05508001, 0x01000001);
        patch_sdk_words(&mut data, &segment, "7.00").unwrap();
        segment.platform_a_sdk = 0x09508001;
        segment.platform_b_sdk = 0x07000001;
        let before = data.clone();
        let outcome = patch_sdk_words(&mut data, &segment, "7.00").unwrap();
        assert_eq!(outcome, PatchOutcome::AlreadyCurrent);
        assert_eq!(data, before);
    }

    #[test]
    fn never_rewrites_zero_sentinel() {
        let (mut data, segment) = segment(0, 0);
        let before = data.clone();
        let outcome = patch_sdk_words(&mut data, &segment, "7.00").unwrap();
        assert_eq!(outcome, PatchOutcome::SentinelZero);
        assert_eq!(data, before);
    }

    #[test]
    fn zero_sentinel_field_is_left_untouched_when_sibling_field_is_stale() {
        let (mut data, segment) = segment(0, 0x01000001);
        let outcome = patch_sdk_words(&mut data, &segment, "7.00").unwrap();
        assert_eq!(outcome, PatchOutcome::Patched);
        assert_eq!(u32::from_le_bytes(data[16..20].try_into().unwrap()), 0);
        assert_eq!(u32::from_le_bytes(data[20..24].try_into().unwrap()), 0x07000001);
    }

    #[test]
    fn unknown_target_firmware_is_reported() {
        let (mut data, segment) = segment(0x05508001, 0x01000001);
        let outcome = patch_sdk_words(&mut data, &segment, "99.99").unwrap();
        assert_eq!(outcome, PatchOutcome::UnknownTarget);
    }
}
