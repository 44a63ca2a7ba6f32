/// Fixed firmware-version to SDK-word mapping, covering every release the
/// reference toolkit shipped a table entry for. `(platform_b, platform_a)`
/// i.e. (PS5 SDK word, PS4-compat SDK word).
const SDK_TABLE: &[(&str, u32, u32)] = &[
    ("1.00", 0x01000001, 0x05508001),
    ("1.05", 0x01050001, 0x05508001),
    ("2.00", 0x02000001, 0x06508001),
    ("2.20", 0x02200001, 0x06508001),
    ("2.50", 0x02500001, 0x06508001),
    ("3.00", 0x03000001, 0x07508001),
    ("3.20", 0x03200001, 0x07508001),
    ("4.00", 0x04000001, 0x08508001),
    ("4.50", 0x04500001, 0x08508001),
    ("5.00", 0x05000001, 0x08508001),
    ("5.02", 0x05020001, 0x08508001),
    ("5.10", 0x05100001, 0x08508001),
    ("5.25", 0x05250001, 0x08508001),
    ("6.00", 0x06000001, 0x09508001),
    ("6.02", 0x06020001, 0x09508001),
    ("6.50", 0x06500001, 0x09508001),
    ("7.00", 0x07000001, 0x09508001),
    ("7.01", 0x07010001, 0x09508001),
    ("7.55", 0x07550001, 0x09508001),
    ("7.61", 0x07610001, 0x09508001),
    ("8.00", 0x08000001, 0x09508001),
    ("8.52", 0x08520001, 0x09508001),
    ("9.00", 0x09000001, 0x09508001),
    ("9.60", 0x09600001, 0x09508001),
    ("10.00", 0x0A000040, 0x12090001),
    ("10.01", 0x0A010040, 0x12090001),
    ("10.50", 0x0A500040, 0x12090001),
    ("11.00", 0x0B000040, 0x12090001),
];

/// Looks up the `(platform_b_sdk, platform_a_sdk)` word pair for a
/// dotted-decimal firmware version string. Returns `None` for any version
/// not in the fixed table.
pub fn sdk_words_for(fw_version: &str) -> Option<(u32, u32)> {
    SDK_TABLE
        .iter()
        .find(|(fw, ..)| *fw == fw_version)
        .map(|&(_, platform_b, platform_a)| (platform_b, platform_a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_version_resolves() {
        assert_eq!(sdk_words_for("7.00"), Some((0x07000001, 0x09508001)));
    }

    #[test]
    fn boundary_versions_resolve() {
        assert_eq!(sdk_words_for("1.00"), Some((0x01000001, 0x05508001)));
        assert_eq!(sdk_words_for("11.00"), Some((0x0B000040, 0x12090001)));
    }

    #[test]
    fn unknown_version_is_none() {
        assert_eq!(sdk_words_for("99.99"), None);
    }
}
