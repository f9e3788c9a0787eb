//! LotMap Settings Crate
//!
//! Handles application configuration: map defaults, analytics options,
//! ring styles, and the data snapshot location.

pub mod config;
pub mod error;

pub use config::{AnalyticsSettings, Config, DataSettings, MapSettings, StyleSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
