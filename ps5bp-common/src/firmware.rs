use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A firmware version, ordered as the tuple `(major, minor)`.
///
/// Parsed from the dotted-decimal strings used throughout the knowledge
/// base and CLI (`"9.60"`, `"10.01"`, ...). Only the first two dotted
/// components are significant; anything beyond is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub major: u32,
    pub minor: u32,
}

impl FirmwareVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        FirmwareVersion { major, minor }
    }
}

impl FromStr for FirmwareVersion {
    type Err = ParseFirmwareVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let major = parts
            .next()
            .ok_or(ParseFirmwareVersionError)?
            .parse()
            .map_err(|_| ParseFirmwareVersionError)?;
        let minor = match parts.next() {
            Some(m) => m.parse().map_err(|_| ParseFirmwareVersionError)?,
            None => 0,
        };
        Ok(FirmwareVersion { major, minor })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFirmwareVersionError;

impl fmt::Display for ParseFirmwareVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid firmware version string")
    }
}

impl std::error::Error for ParseFirmwareVersionError {}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

impl PartialOrd for FirmwareVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FirmwareVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor).cmp(&(other.major, other.minor))
    }
}

/// Severity bucket for the absolute major-version gap between two firmwares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirmwareGapLevel {
    Small,
    Moderate,
    Large,
    Huge,
}

impl fmt::Display for FirmwareGapLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FirmwareGapLevel::Small => "small",
            FirmwareGapLevel::Moderate => "moderate",
            FirmwareGapLevel::Large => "large",
            FirmwareGapLevel::Huge => "huge",
        };
        write!(f, "{s}")
    }
}

/// Absolute difference of major-version integers between two firmwares.
pub fn firmware_gap(source: &FirmwareVersion, target: &FirmwareVersion) -> u32 {
    source.major.abs_diff(target.major)
}

/// Classifies a firmware gap at thresholds 1/2/4, matching the knowledge
/// base's `>=` comparisons (a gap of exactly 4 is already `Huge`).
pub fn firmware_gap_level(gap: u32) -> FirmwareGapLevel {
    if gap >= 4 {
        FirmwareGapLevel::Huge
    } else if gap >= 2 {
        FirmwareGapLevel::Large
    } else if gap >= 1 {
        FirmwareGapLevel::Moderate
    } else {
        FirmwareGapLevel::Small
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_major_minor() {
        let fw: FirmwareVersion = "9.60".parse().unwrap();
        assert_eq!(fw, FirmwareVersion::new(9, 60));
    }

    #[test]
    fn parses_major_only() {
        let fw: FirmwareVersion = "10".parse().unwrap();
        assert_eq!(fw, FirmwareVersion::new(10, 0));
    }

    #[test]
    fn orders_lexicographically() {
        let a: FirmwareVersion = "9.60".parse().unwrap();
        let b: FirmwareVersion = "10.00".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn transitive_compare() {
        let a: FirmwareVersion = "1.00".parse().unwrap();
        let b: FirmwareVersion = "5.00".parse().unwrap();
        let c: FirmwareVersion = "9.60".parse().unwrap();
        assert!(a < b && b < c && a < c);
    }

    #[test]
    fn huge_gap_example() {
        let source: FirmwareVersion = "9.60".parse().unwrap();
        let target: FirmwareVersion = "4.00".parse().unwrap();
        let gap = firmware_gap(&source, &target);
        assert_eq!(gap, 5);
        assert_eq!(firmware_gap_level(gap), FirmwareGapLevel::Huge);
    }

    #[test]
    fn gap_level_monotonic() {
        let levels: Vec<_> = (0..6).map(firmware_gap_level).collect();
        for w in levels.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }
}
