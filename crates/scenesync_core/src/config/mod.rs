//! Configuration management for Scene Sync.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Automatic defaults for missing keys
//!
//! # Example
//!
//! ```no_run
//! use scenesync_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/scene-sync.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Scene threshold: {}%", config.settings().fingerprint.scene_threshold_pct);
//!
//! config.settings_mut().alignment.max_speed_ratio = 2.0;
//! config.update_section(ConfigSection::Alignment).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    AlignmentSettings, ConfigSection, ExportSettings, FingerprintSettings, LoggingSettings,
    PathSettings, Settings, ToolSettings,
};
