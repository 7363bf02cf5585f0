//! Cell barcode match evidence

use serde::{Deserialize, Serialize};

/// Quality of the match between a read's barcode and the whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum MatchQuality {
    NoMatch,
    Exact,
    OneInexact,
    MultipleInexact,
}

impl MatchQuality {
    /// Integer code written to the record stream.
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            MatchQuality::NoMatch => -1,
            MatchQuality::Exact => 0,
            MatchQuality::OneInexact => 1,
            MatchQuality::MultipleInexact => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(MatchQuality::NoMatch),
            0 => Some(MatchQuality::Exact),
            1 => Some(MatchQuality::OneInexact),
            2 => Some(MatchQuality::MultipleInexact),
            _ => None,
        }
    }
}

impl TryFrom<i32> for MatchQuality {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        MatchQuality::from_code(code).ok_or_else(|| format!("Unknown barcode match code {}", code))
    }
}

impl From<MatchQuality> for i32 {
    fn from(quality: MatchQuality) -> Self {
        quality.code()
    }
}

/// Result of matching one read's cell barcode, plus its UMI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeMatch {
    pub umi: String,
    pub quality: MatchQuality,
    /// Candidate whitelist indices; the first one is the best candidate
    #[serde(default)]
    pub candidates: Vec<u64>,
    /// Matched barcode(s) as written to the record stream
    pub display: String,
}

impl BarcodeMatch {
    /// Build an exact match against a single whitelist index.
    pub fn exact(umi: impl Into<String>, index: u64) -> Self {
        Self {
            umi: umi.into(),
            quality: MatchQuality::Exact,
            candidates: vec![index],
            display: index.to_string(),
        }
    }

    /// Matching failed outright; such reads are never classified.
    #[inline]
    pub fn is_failed(&self) -> bool {
        self.quality.code() < 0
    }

    #[inline]
    pub fn best_candidate(&self) -> Option<u64> {
        self.candidates.first().copied()
    }
}
