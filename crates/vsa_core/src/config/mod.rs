//! Configuration management.
//!
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only the changed section is rewritten)
//!
//! # Example
//!
//! ```no_run
//! use vsa_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! config.settings_mut().encoder.video_codec = "h264_nvenc".to_string();
//! config.update_section(ConfigSection::Encoder).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    BackgroundSettings, BatchSettings, ConfigSection, EncoderSettings, LoggingSettings,
    PathSettings, Settings, SuffixSettings,
};
