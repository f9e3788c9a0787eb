//! Configuration and settings management for LotMap
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files, chosen by extension, stored in the platform config directory
//! by default.
//!
//! Configuration is organized into sections:
//! - Map defaults (initial view, fit padding)
//! - Analytics options (ranking size, crop paging, report unit)
//! - Ring styles for lots, sublots, and the drawing preview
//! - Data source (snapshot file for offline reports)

pub use lotmap_core::units::AreaUnit;
use lotmap_core::{DisplayPoint, RingStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Largest accepted fit padding ratio per edge.
pub const MAX_FIT_PADDING: f64 = 0.5;

/// Map view defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// View center before any data is loaded, `[lat, lng]`
    pub initial_center: DisplayPoint,
    /// Tile zoom level before any data is loaded
    pub initial_zoom: u8,
    /// Padding added on each edge when fitting the view to data
    pub fit_padding: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            initial_center: DisplayPoint::new(4.711, -74.0721),
            initial_zoom: 13,
            fit_padding: 0.05,
        }
    }
}

/// Analytics and reporting options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Number of lots in the area ranking
    pub top_n: usize,
    /// Crops requested per page during refresh
    pub crops_page_size: u32,
    /// Unit used in reports
    pub area_unit: AreaUnit,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            top_n: 5,
            crops_page_size: 100,
            area_unit: AreaUnit::Hectares,
        }
    }
}

/// Ring styles handed to the map surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    pub active_lot: RingStyle,
    pub inactive_lot: RingStyle,
    pub sublot: RingStyle,
    pub preview: RingStyle,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            active_lot: RingStyle::default(),
            inactive_lot: RingStyle::new("#757575", "#bdbdbd", 0.25),
            sublot: RingStyle::new("#f9a825", "#fff176", 0.3),
            preview: RingStyle::new("#1565c0", "#64b5f6", 0.2).dashed(),
        }
    }
}

impl StyleSettings {
    pub fn for_lot(&self, active: bool) -> &RingStyle {
        if active {
            &self.active_lot
        } else {
            &self.inactive_lot
        }
    }

    fn entries(&self) -> [(&'static str, &RingStyle); 4] {
        [
            ("styles.active_lot", &self.active_lot),
            ("styles.inactive_lot", &self.inactive_lot),
            ("styles.sublot", &self.sublot),
            ("styles.preview", &self.preview),
        ]
    }
}

/// Data source settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// JSON snapshot of lots, sublots, and crops
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: MapSettings,
    pub analytics: AnalyticsSettings,
    pub styles: StyleSettings,
    pub data: DataSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into()),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/lotmap/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("lotmap").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let load_error = |reason: String| SettingsError::LoadError {
            path: path.display().to_string(),
            reason,
        };
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?,
            Format::Toml => toml::from_str(&content).map_err(|e| load_error(e.to_string()))?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
            Format::Toml => toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let center = self.map.initial_center;
        if !center.is_finite() || !(-90.0..=90.0).contains(&center.lat) {
            return Err(
                ConfigError::out_of_range("map.initial_center", format!("{:?}", center)).into(),
            );
        }

        if !(0.0..=MAX_FIT_PADDING).contains(&self.map.fit_padding) {
            return Err(ConfigError::out_of_range("map.fit_padding", self.map.fit_padding).into());
        }

        if self.analytics.top_n == 0 {
            return Err(ConfigError::out_of_range("analytics.top_n", self.analytics.top_n).into());
        }

        if self.analytics.crops_page_size == 0 {
            return Err(ConfigError::out_of_range(
                "analytics.crops_page_size",
                self.analytics.crops_page_size,
            )
            .into());
        }

        for (key, style) in self.styles.entries() {
            if style.stroke.trim().is_empty() || style.fill.trim().is_empty() {
                return Err(SettingsError::InvalidSetting {
                    key: key.to_string(),
                    reason: "colours must not be empty".to_string(),
                });
            }
            if !style.is_valid() {
                return Err(SettingsError::InvalidSetting {
                    key: key.to_string(),
                    reason: "fill opacity must be within 0..=1 and weight > 0".to_string(),
                });
            }
        }

        Ok(())
    }
}
