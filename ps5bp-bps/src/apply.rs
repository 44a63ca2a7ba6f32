use ps5bp_common::{Error, Result};

use crate::format::{footer_offset, parse_footer, parse_header};
use crate::vlc::{decode_signed, read_vlc};

const ACTION_SOURCE_READ: u64 = 0;
const ACTION_TARGET_READ: u64 = 1;
const ACTION_SOURCE_COPY: u64 = 2;
const ACTION_TARGET_COPY: u64 = 3;

/// Verifies the source/target/patch-body CRC-32 checksums without
/// applying the patch. `target` may be omitted when only validating a
/// patch before running it.
pub fn validate_patch(source: &[u8], patch: &[u8], target: Option<&[u8]>) -> Result<()> {
    let header = parse_header(patch)?;
    let footer = parse_footer(patch)?;

    if source.len() as u64 != header.source_size {
        return Err(Error::ChecksumMismatch(format!(
            "source length {} does not match patch-declared {}",
            source.len(),
            header.source_size
        )));
    }
    if crc32fast::hash(source) != footer.src_crc {
        return Err(Error::ChecksumMismatch("source CRC-32 mismatch".into()));
    }

    let body_end = footer_offset(patch);
    if crc32fast::hash(&patch[..body_end]) != footer.patch_body_crc {
        return Err(Error::ChecksumMismatch("patch body CRC-32 mismatch".into()));
    }

    if let Some(target) = target {
        if crc32fast::hash(target) != footer.tgt_crc {
            return Err(Error::ChecksumMismatch("target CRC-32 mismatch".into()));
        }
    }

    Ok(())
}

/// Applies `patch` to `source`, returning the reconstructed target bytes.
/// Verifies source and patch-body CRCs before running, and the target CRC
/// after, and any mismatch aborts with no partial output returned.
pub fn apply_patch(source: &[u8], patch: &[u8]) -> Result<Vec<u8>> {
    let header = parse_header(patch)?;
    let footer = parse_footer(patch)?;

    if source.len() as u64 != header.source_size {
        return Err(Error::ChecksumMismatch(format!(
            "source length {} does not match patch-declared {}",
            source.len(),
            header.source_size
        )));
    }
    if crc32fast::hash(source) != footer.src_crc {
        return Err(Error::ChecksumMismatch("source CRC-32 mismatch".into()));
    }
    let body_end = footer_offset(patch);
    if crc32fast::hash(&patch[..body_end]) != footer.patch_body_crc {
        return Err(Error::ChecksumMismatch("patch body CRC-32 mismatch".into()));
    }

    let mut target = Vec::with_capacity(header.target_size as usize);
    let mut pos = header.body_start;
    let mut src_pos: usize = 0;

    while pos < body_end {
        let packed = read_vlc(patch, &mut pos).ok_or_else(|| Error::malformed("truncated BPS action header"))?;
        let action = packed & 3;
        let length = (packed >> 2) as usize + 1;

        match action {
            ACTION_SOURCE_READ => {
                let end = src_pos
                    .checked_add(length)
                    .filter(|&e| e <= source.len())
                    .ok_or_else(|| Error::malformed("SourceRead runs past source"))?;
                target.extend_from_slice(&source[src_pos..end]);
                src_pos = end;
            }
            ACTION_TARGET_READ => {
                let end = pos
                    .checked_add(length)
                    .filter(|&e| e <= body_end)
                    .ok_or_else(|| Error::malformed("TargetRead runs past patch body"))?;
                target.extend_from_slice(&patch[pos..end]);
                pos = end;
            }
            ACTION_SOURCE_COPY => {
                let raw = read_vlc(patch, &mut pos).ok_or_else(|| Error::malformed("truncated SourceCopy delta"))?;
                let delta = decode_signed(raw);
                let new_src_pos = src_pos as i64 + delta;
                if new_src_pos < 0 {
                    return Err(Error::malformed("SourceCopy delta underflows source position"));
                }
                src_pos = new_src_pos as usize;
                let end = src_pos
                    .checked_add(length)
                    .filter(|&e| e <= source.len())
                    .ok_or_else(|| Error::malformed("SourceCopy runs past source"))?;
                target.extend_from_slice(&source[src_pos..end]);
                src_pos = end;
            }
            ACTION_TARGET_COPY => {
                let raw = read_vlc(patch, &mut pos).ok_or_else(|| Error::malformed("truncated TargetCopy delta"))?;
                let delta = decode_signed(raw);
                let mut copy_pos = target.len() as i64 + delta;
                if copy_pos < 0 {
                    return Err(Error::malformed("TargetCopy delta underflows target position"));
                }
                // byte-by-byte: TargetCopy may self-reference bytes just
                // written within this same action (run-length patterns).
                for _ in 0..length {
                    if copy_pos as usize >= target.len() {
                        return Err(Error::malformed("TargetCopy reads past written target"));
                    }
                    let byte = target[copy_pos as usize];
                    target.push(byte);
                    copy_pos += 1;
                }
            }
            _ => unreachable!("action is masked to 2 bits"),
        }
    }

    if target.len() as u64 != header.target_size {
        return Err(Error::ChecksumMismatch(format!(
            "produced target length {} does not match patch-declared {}",
            target.len(),
            header.target_size
        )));
    }
    if crc32fast::hash(&target) != footer.tgt_crc {
        return Err(Error::ChecksumMismatch("target CRC-32 mismatch".into()));
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vlc::write_vlc;

    fn build_patch(source_size: u64, target_size: u64, body: &[u8]) -> Vec<u8> {
        let mut patch = b"BPS1".to_vec();
        write_vlc(source_size, &mut patch);
        write_vlc(target_size, &mut patch);
        write_vlc(0, &mut patch); // metadata_size
        patch.extend_from_slice(body);
        patch
    }

    fn finish_patch(mut patch: Vec<u8>, source: &[u8], target: &[u8]) -> Vec<u8> {
        let src_crc = crc32fast::hash(source);
        let tgt_crc = crc32fast::hash(target);
        patch.extend_from_slice(&src_crc.to_le_bytes());
        patch.extend_from_slice(&tgt_crc.to_le_bytes());
        let patch_body_crc = crc32fast::hash(&patch);
        patch.extend_from_slice(&patch_body_crc.to_le_bytes());
        patch
    }

    #[test]
    fn target_read_produces_literal_bytes() {
        let source = b"";
        let target = b"ABC";
        let mut body = Vec::new();
        // action = TargetRead(1), length = 3 -> packed = ((3-1)<<2)|1 = 9
        write_vlc(9, &mut body);
        body.extend_from_slice(target);

        let patch = build_patch(0, 3, &body);
        let patch = finish_patch(patch, source, target);

        let result = apply_patch(source, &patch).unwrap();
        assert_eq!(result, target);
    }

    #[test]
    fn target_copy_self_reference_produces_run() {
        let source = b"";
        // first write 1 byte 'X' via TargetRead, then TargetCopy length 5 delta -1
        let target = b"XXXXXX";
        let mut body = Vec::new();
        write_vlc(((1 - 1) << 2) | 1, &mut body); // TargetRead length 1
        body.push(b'X');
        // TargetCopy length 5, delta -1: packed = ((5-1)<<2)|3 = 19
        write_vlc(19, &mut body);
        write_vlc(crate::vlc::encode_signed(-1), &mut body);

        let patch = build_patch(0, 6, &body);
        let patch = finish_patch(patch, source, target);

        let result = apply_patch(source, &patch).unwrap();
        assert_eq!(result, target);
    }

    #[test]
    fn source_read_copies_from_source() {
        let source = b"hello world";
        let target = b"hello";
        let mut body = Vec::new();
        write_vlc(((5 - 1) << 2) | 0, &mut body); // SourceRead length 5
        let patch = build_patch(source.len() as u64, target.len() as u64, &body);
        let patch = finish_patch(patch, source, target);

        let result = apply_patch(source, &patch).unwrap();
        assert_eq!(result, target);
    }

    #[test]
    fn corrupted_source_crc_is_rejected() {
        let source = b"abc";
        let target = b"abc";
        let mut body = Vec::new();
        write_vlc(((3 - 1) << 2) | 0, &mut body);
        let patch = build_patch(source.len() as u64, target.len() as u64, &body);
        let mut patch = finish_patch(patch, source, target);
        // flip a byte in the src_crc footer field
        let len = patch.len();
        patch[len - 12] ^= 0xFF;

        let result = apply_patch(source, &patch);
        assert!(result.is_err());
    }
}
