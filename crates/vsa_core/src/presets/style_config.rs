//! User-facing subtitle style.
//!
//! Fields are stored as strings exactly as entered in the preset file;
//! they are validated when the style is projected onto cues.

use serde::{Deserialize, Serialize};

/// Name of the preset that always exists and cannot be deleted.
pub const DEFAULT_PRESET_NAME: &str = "Default";

/// One named subtitle style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub font: String,
    pub font_size: String,
    /// `&HBBGGRR&` (legacy) or `&HAABBGGRR`.
    pub primary_color: String,
    pub outline_color: String,
    pub back_color: String,
    pub outline: String,
    pub shadow: String,
    pub margin_v: String,
    /// Applied to both left and right margins.
    pub margin_h: String,
    /// Numpad position, 1-9.
    pub alignment: String,
    /// Advisory line length; never used to wrap.
    pub max_chars: String,
    pub name: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            font_size: "48".to_string(),
            primary_color: "&HFFFFFF&".to_string(),
            outline_color: "&H000000&".to_string(),
            back_color: "&H000000&".to_string(),
            outline: "2".to_string(),
            shadow: "0".to_string(),
            margin_v: "20".to_string(),
            margin_h: "20".to_string(),
            alignment: "2".to_string(),
            max_chars: "40".to_string(),
            name: DEFAULT_PRESET_NAME.to_string(),
        }
    }
}

impl StyleConfig {
    /// Default values under a new name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let style: StyleConfig =
            serde_json::from_str(r#"{ "name": "Big", "font_size": "72" }"#).unwrap();
        assert_eq!(style.name, "Big");
        assert_eq!(style.font_size, "72");
        assert_eq!(style.font, "Arial");
        assert_eq!(style.alignment, "2");
    }

    #[test]
    fn serializes_all_fields_as_strings() {
        let json = serde_json::to_value(StyleConfig::default()).unwrap();
        assert_eq!(json["margin_h"], "20");
        assert_eq!(json["primary_color"], "&HFFFFFF&");
        assert_eq!(json.as_object().unwrap().len(), 12);
    }
}
