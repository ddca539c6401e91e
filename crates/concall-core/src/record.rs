use serde::{Deserialize, Serialize};

/// Quarter of the April-March fiscal year used by Indian filings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// Quarter from its 1-based number, `None` outside 1..=4.
    #[must_use]
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(Quarter::Q1),
            2 => Some(Quarter::Q2),
            3 => Some(Quarter::Q3),
            4 => Some(Quarter::Q4),
            _ => None,
        }
    }

    #[must_use]
    pub fn number(self) -> u32 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quarter::Q1 => write!(f, "Q1"),
            Quarter::Q2 => write!(f, "Q2"),
            Quarter::Q3 => write!(f, "Q3"),
            Quarter::Q4 => write!(f, "Q4"),
        }
    }
}

/// A single concall transcript discovered on the portal, resolved to the
/// fiscal period it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Display name used in destination file names.
    pub entity_name: String,
    /// Four-digit fiscal year the transcript covers (e.g. 2025 for FY2025).
    pub fiscal_year: i32,
    pub quarter: Quarter,
    /// Absolute URL of the transcript document.
    pub source_url: String,
}

impl TranscriptRecord {
    /// Period key used to de-duplicate within one discovery pass.
    #[must_use]
    pub fn period(&self) -> (i32, Quarter) {
        (self.fiscal_year, self.quarter)
    }
}
