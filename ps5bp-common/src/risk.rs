/// How risky it is to stub a given symbol instead of providing a real
/// implementation or fakelib.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StubRisk {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl StubRisk {
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }
}

impl std::fmt::Display for StubRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StubRisk::Safe => "safe",
            StubRisk::Low => "low",
            StubRisk::Medium => "medium",
            StubRisk::High => "high",
            StubRisk::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Replacement instruction sequence a [`StubMode`] writes into a PLT slot.
///
/// `Skip` is not a palette entry: the stubber must leave bytes completely
/// untouched for any symbol classified this way, even on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StubMode {
    Nop,
    RetZero,
    RetError,
    Skip,
}

impl std::fmt::Display for StubMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StubMode::Nop => "nop",
            StubMode::RetZero => "ret_zero",
            StubMode::RetError => "ret_error",
            StubMode::Skip => "skip",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_ordering() {
        assert!(StubRisk::Safe < StubRisk::Critical);
        assert_eq!(StubRisk::Low.worst(StubRisk::High), StubRisk::High);
    }
}
