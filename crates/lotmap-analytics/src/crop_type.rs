//! Crop-type normalization.
//!
//! Free-text crop types are folded into three canonical buckets by
//! case-insensitive substring match. Anything else passes through
//! lower-cased and sorts after the canonical buckets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized crop type.
///
/// The derived ordering is the filter-list ordering: the canonical buckets
/// first, then unrecognized types alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CropCategory {
    Perennes,
    Transitorios,
    Semiperennes,
    /// Unrecognized type, lower-cased.
    Other(String),
}

impl CropCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Perennes => "perennes",
            Self::Transitorios => "transitorios",
            Self::Semiperennes => "semiperennes",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// Normalizes a raw crop type. Blank input has no category.
pub fn normalize_crop_type(raw: &str) -> Option<CropCategory> {
    if raw.trim().is_empty() {
        return None;
    }
    let lower = raw.to_lowercase();
    let category = if lower.contains("peren") {
        if lower.contains("semi") {
            CropCategory::Semiperennes
        } else {
            CropCategory::Perennes
        }
    } else if lower.contains("transito") {
        CropCategory::Transitorios
    } else {
        CropCategory::Other(lower)
    };
    Some(category)
}

impl fmt::Display for CropCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_crop_type(s).ok_or_else(|| "Crop type is blank".to_string())
    }
}

impl From<CropCategory> for String {
    fn from(category: CropCategory) -> Self {
        match category {
            CropCategory::Other(raw) => raw,
            canonical => canonical.as_str().to_string(),
        }
    }
}

impl TryFrom<String> for CropCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
