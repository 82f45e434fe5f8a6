//! Analysis tiers.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Longest tier name echoed back in an `UnknownTier` error.
const MAX_ECHOED_TIER_LEN: usize = 64;

/// A named analysis mode fixing price, prompt and expected output shape.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTier {
    Basic,
    Comprehensive,
    Batch,
    Complicated,
}

impl AnalysisTier {
    pub const ALL: [AnalysisTier; 4] = [
        AnalysisTier::Basic,
        AnalysisTier::Comprehensive,
        AnalysisTier::Batch,
        AnalysisTier::Complicated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Comprehensive => "comprehensive",
            Self::Batch => "batch",
            Self::Complicated => "complicated",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }
}

impl fmt::Display for AnalysisTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "comprehensive" => Ok(Self::Comprehensive),
            "batch" => Ok(Self::Batch),
            "complicated" => Ok(Self::Complicated),
            _ => Err(Error::UnknownTier {
                tier: s.chars().take(MAX_ECHOED_TIER_LEN).collect(),
            }),
        }
    }
}
