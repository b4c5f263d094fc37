//! Subtitle style presets.

mod store;
mod style_config;

pub use store::{PresetError, PresetStore};
pub use style_config::{StyleConfig, DEFAULT_PRESET_NAME};
