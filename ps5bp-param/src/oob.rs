use ps5bp_common::{Error, FirmwareVersion, Result};
use regex::Regex;

const JSON_FIELDS: [&str; 2] = ["requiredSystemSoftwareVersion", "sdkVersion"];

/// Builds the 16-hex-digit value `0x{major:02X}{minor:02X}` followed by
/// twelve zero digits that both `param.json` fields are rewritten to.
fn encoded_hex_value(fw: FirmwareVersion) -> String {
    format!("0x{:02X}{:02X}000000000000", fw.major, fw.minor)
}

/// Rewrites `requiredSystemSoftwareVersion` and `sdkVersion` in a
/// `param.json` document's raw text to the encoded target-firmware value,
/// by regex substitution against each field's quoted string value. The
/// rest of the document is left byte-identical; this never re-serializes
/// the JSON, to avoid reformatting unrelated fields.
pub fn patch_param_json(contents: &str, fw: FirmwareVersion) -> Result<String> {
    let value = encoded_hex_value(fw);
    let mut out = contents.to_string();
    for field in JSON_FIELDS {
        let pattern = format!(r#"("{field}"\s*:\s*)"0x[0-9A-Fa-f]+""#);
        let re = Regex::new(&pattern).map_err(|e| Error::malformed(format!("invalid param.json field regex: {e}")))?;
        let replacement = format!(r#"${{1}}"{value}""#);
        out = re.replace_all(&out, replacement.as_str()).into_owned();
    }
    Ok(out)
}

/// Rewrites the `SYSTEM_VER` word inside a `param.sfo` byte buffer.
///
/// Scans only the second half of the file for a little-endian 32-bit
/// value matching `0x??MM0000` with a plausible firmware-major top byte
/// (`<= 0x10`), rewriting the first match to `(major << 24) | (minor <<
/// 16)`. This mirrors the original heuristic exactly; it is not a
/// placeholder awaiting a better policy.
pub fn patch_param_sfo(data: &mut [u8], fw: FirmwareVersion) -> Result<bool> {
    if !data.windows(4).any(|w| w == b"SYSTEM_VER") {
        return Ok(false);
    }

    let half = data.len() / 2;
    let target = (fw.major << 24) | (fw.minor << 16);

    let mut i = half;
    while i + 4 <= data.len() {
        let word = u32::from_le_bytes(data[i..i + 4].try_into().unwrap());
        let top_byte = (word >> 24) & 0xFF;
        let low_two_bytes = word & 0xFFFF;
        if word != 0 && low_two_bytes == 0 && top_byte <= 0x10 {
            if word != target {
                data[i..i + 4].copy_from_slice(&target.to_le_bytes());
                return Ok(true);
            }
            return Ok(false);
        }
        i += 1;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_both_json_fields_in_place() {
        let contents = r#"{
  "requiredSystemSoftwareVersion": "0x0100000000000000",
  "sdkVersion": "0x0100000000000000",
  "titleId": "CUSA00000"
}"#;
        let fw = FirmwareVersion::new(7, 0);
        let patched = patch_param_json(contents, fw).unwrap();
        assert!(patched.contains(r#""requiredSystemSoftwareVersion": "0x0700000000000000""#));
        assert!(patched.contains(r#""sdkVersion": "0x0700000000000000""#));
        assert!(patched.contains("CUSA00000"));
    }

    #[test]
    fn sfo_rewrite_finds_first_candidate_in_second_half() {
        let mut data = vec![0u8; 64];
        data[0..10].copy_from_slice(b"SYSTEM_VER");
        // a plausible-but-wrong candidate in the first half must be ignored
        data[4..8].copy_from_slice(&0x01040000u32.to_le_bytes());
        // the real candidate, placed in the second half
        data[40..44].copy_from_slice(&0x01040000u32.to_le_bytes());

        let fw = FirmwareVersion::new(7, 0);
        let changed = patch_param_sfo(&mut data, fw).unwrap();
        assert!(changed);
        let rewritten = u32::from_le_bytes(data[40..44].try_into().unwrap());
        assert_eq!(rewritten, (7u32 << 24) | (0u32 << 16));
        // first-half candidate left untouched
        assert_eq!(u32::from_le_bytes(data[4..8].try_into().unwrap()), 0x01040000);
    }

    #[test]
    fn sfo_without_system_ver_key_is_untouched() {
        let mut data = vec![0u8; 32];
        let changed = patch_param_sfo(&mut data, FirmwareVersion::new(7, 0)).unwrap();
        assert!(!changed);
    }
}
