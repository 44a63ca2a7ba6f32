use ps5bp_common::{Error, Result};

use crate::vlc::read_vlc;

const MAGIC: &[u8; 4] = b"BPS1";
const FOOTER_SIZE: usize = 12;

/// Parsed `BPS1` header plus the offset the action stream starts at.
#[derive(Debug, Clone)]
pub struct BpsHeader {
    pub source_size: u64,
    pub target_size: u64,
    pub metadata: String,
    pub body_start: usize,
}

/// The three trailing CRC-32 words.
#[derive(Debug, Clone, Copy)]
pub struct BpsFooter {
    pub src_crc: u32,
    pub tgt_crc: u32,
    pub patch_body_crc: u32,
}

pub fn parse_header(patch: &[u8]) -> Result<BpsHeader> {
    if patch.len() < MAGIC.len() + FOOTER_SIZE || &patch[..MAGIC.len()] != MAGIC {
        return Err(Error::malformed("not a BPS1 patch"));
    }
    let mut pos = MAGIC.len();
    let source_size = read_vlc(patch, &mut pos).ok_or_else(|| Error::malformed("truncated BPS header"))?;
    let target_size = read_vlc(patch, &mut pos).ok_or_else(|| Error::malformed("truncated BPS header"))?;
    let metadata_size =
        read_vlc(patch, &mut pos).ok_or_else(|| Error::malformed("truncated BPS header"))? as usize;

    let metadata_end = pos
        .checked_add(metadata_size)
        .filter(|&e| e <= patch.len())
        .ok_or_else(|| Error::malformed("BPS metadata size overruns patch"))?;
    let metadata = String::from_utf8_lossy(&patch[pos..metadata_end]).into_owned();

    Ok(BpsHeader {
        source_size,
        target_size,
        metadata,
        body_start: metadata_end,
    })
}

pub fn parse_footer(patch: &[u8]) -> Result<BpsFooter> {
    if patch.len() < FOOTER_SIZE {
        return Err(Error::malformed("BPS patch too short for footer"));
    }
    let footer = &patch[patch.len() - FOOTER_SIZE..];
    let src_crc = u32::from_le_bytes(footer[0..4].try_into().unwrap());
    let tgt_crc = u32::from_le_bytes(footer[4..8].try_into().unwrap());
    let patch_body_crc = u32::from_le_bytes(footer[8..12].try_into().unwrap());
    Ok(BpsFooter { src_crc, tgt_crc, patch_body_crc })
}

pub fn footer_offset(patch: &[u8]) -> usize {
    patch.len() - FOOTER_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_magic() {
        let patch = b"XXXX\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        assert!(parse_header(patch).is_err());
    }

    #[test]
    fn parses_minimal_header() {
        let mut patch = b"BPS1".to_vec();
        patch.push(0x83); // source_size = 3
        patch.push(0x83); // target_size = 3
        patch.push(0x80); // metadata_size = 0
        patch.extend_from_slice(&[0u8; 12]);
        let header = parse_header(&patch).unwrap();
        assert_eq!(header.source_size, 3);
        assert_eq!(header.target_size, 3);
        assert_eq!(header.metadata, "");
    }
}
