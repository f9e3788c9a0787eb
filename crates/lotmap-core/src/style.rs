use serde::{Deserialize, Serialize};

/// Stroke/fill description handed to the map surface along with rings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingStyle {
    /// Stroke colour as a CSS hex string
    pub stroke: String,
    /// Fill colour as a CSS hex string
    pub fill: String,
    /// Fill opacity in `0.0..=1.0`
    pub fill_opacity: f64,
    /// Stroke weight in pixels
    pub weight: f64,
    #[serde(default)]
    pub dashed: bool,
}

impl RingStyle {
    pub fn new(stroke: impl Into<String>, fill: impl Into<String>, fill_opacity: f64) -> Self {
        Self {
            stroke: stroke.into(),
            fill: fill.into(),
            fill_opacity,
            weight: 2.0,
            dashed: false,
        }
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.fill_opacity) && self.weight > 0.0 && self.weight.is_finite()
    }
}

impl Default for RingStyle {
    fn default() -> Self {
        Self::new("#2e7d32", "#66bb6a", 0.35)
    }
}
