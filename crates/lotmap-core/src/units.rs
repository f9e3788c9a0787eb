//! Area unit utilities
//!
//! Handles conversion between square meters and hectares for reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Square meters in one hectare.
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Area unit selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaUnit {
    /// Square meters
    #[serde(rename = "m2")]
    SquareMeters,
    /// Hectares
    #[serde(rename = "ha")]
    Hectares,
}

impl Default for AreaUnit {
    fn default() -> Self {
        Self::Hectares
    }
}

impl AreaUnit {
    /// Converts a value in square meters into this unit.
    pub fn from_square_meters(self, square_meters: f64) -> f64 {
        match self {
            Self::SquareMeters => square_meters,
            Self::Hectares => square_meters / SQUARE_METERS_PER_HECTARE,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::SquareMeters => "m²",
            Self::Hectares => "ha",
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SquareMeters => write!(f, "Square meters"),
            Self::Hectares => write!(f, "Hectares"),
        }
    }
}

impl FromStr for AreaUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m2" | "m²" | "sqm" | "square_meters" => Ok(Self::SquareMeters),
            "ha" | "hectare" | "hectares" => Ok(Self::Hectares),
            _ => Err(format!("Unknown area unit: {}", s)),
        }
    }
}

/// Format an area for display
///
/// * `square_meters` - Area in square meters
/// * `unit` - Target unit
pub fn format_area(square_meters: f64, unit: AreaUnit) -> String {
    match unit {
        AreaUnit::SquareMeters => format!("{:.0} {}", square_meters, unit.symbol()),
        AreaUnit::Hectares => format!(
            "{:.2} {}",
            unit.from_square_meters(square_meters),
            unit.symbol()
        ),
    }
}
