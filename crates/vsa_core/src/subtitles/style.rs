//! Style projection: preset fields onto ASS style records and cue text.
//!
//! Every [`StyleConfig`] field is listed in [`StyleField`] together with the
//! ASS style fields it drives and the rule used to parse it. Adding a field
//! to the config without extending the table fails to compile in
//! [`StyleField::raw`].

use crate::presets::StyleConfig;

use super::error::InvalidStyleError;
use super::markup::{srt_to_ass_text, with_alignment};
use super::types::{
    AssColor, SubtitleCue, SubtitleData, SubtitleFormat, SubtitleStyle, DEFAULT_STYLE_NAME,
};

/// How a raw field string is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRule {
    /// Any non-empty text.
    Text,
    /// Integer within an inclusive range.
    Integer { min: i64, max: i64 },
    /// ASS color string.
    Color,
}

/// Projected style fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleField {
    Font,
    FontSize,
    PrimaryColor,
    OutlineColor,
    BackColor,
    Outline,
    Shadow,
    MarginV,
    MarginH,
    Alignment,
    MaxChars,
}

impl StyleField {
    pub const ALL: [StyleField; 11] = [
        Self::Font,
        Self::FontSize,
        Self::PrimaryColor,
        Self::OutlineColor,
        Self::BackColor,
        Self::Outline,
        Self::Shadow,
        Self::MarginV,
        Self::MarginH,
        Self::Alignment,
        Self::MaxChars,
    ];

    /// Key in the preset file.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Font => "font",
            Self::FontSize => "font_size",
            Self::PrimaryColor => "primary_color",
            Self::OutlineColor => "outline_color",
            Self::BackColor => "back_color",
            Self::Outline => "outline",
            Self::Shadow => "shadow",
            Self::MarginV => "margin_v",
            Self::MarginH => "margin_h",
            Self::Alignment => "alignment",
            Self::MaxChars => "max_chars",
        }
    }

    /// ASS style fields written from this config field.
    pub fn ass_fields(self) -> &'static [&'static str] {
        match self {
            Self::Font => &["Fontname"],
            Self::FontSize => &["Fontsize"],
            Self::PrimaryColor => &["PrimaryColour"],
            Self::OutlineColor => &["OutlineColour"],
            Self::BackColor => &["BackColour"],
            Self::Outline => &["Outline"],
            Self::Shadow => &["Shadow"],
            Self::MarginV => &["MarginV"],
            Self::MarginH => &["MarginL", "MarginR"],
            Self::Alignment => &["Alignment"],
            Self::MaxChars => &[],
        }
    }

    pub fn rule(self) -> ParseRule {
        const NON_NEGATIVE: ParseRule = ParseRule::Integer {
            min: 0,
            max: i32::MAX as i64,
        };
        match self {
            Self::Font => ParseRule::Text,
            Self::FontSize => ParseRule::Integer {
                min: 1,
                max: i32::MAX as i64,
            },
            Self::PrimaryColor | Self::OutlineColor | Self::BackColor => ParseRule::Color,
            Self::Outline | Self::Shadow | Self::MarginV | Self::MarginH | Self::MaxChars => {
                NON_NEGATIVE
            }
            Self::Alignment => ParseRule::Integer { min: 1, max: 9 },
        }
    }

    /// Raw string value of this field in `config`.
    pub fn raw(self, config: &StyleConfig) -> &str {
        match self {
            Self::Font => &config.font,
            Self::FontSize => &config.font_size,
            Self::PrimaryColor => &config.primary_color,
            Self::OutlineColor => &config.outline_color,
            Self::BackColor => &config.back_color,
            Self::Outline => &config.outline,
            Self::Shadow => &config.shadow,
            Self::MarginV => &config.margin_v,
            Self::MarginH => &config.margin_h,
            Self::Alignment => &config.alignment,
            Self::MaxChars => &config.max_chars,
        }
    }

    fn parse_int(self, config: &StyleConfig) -> Result<i64, InvalidStyleError> {
        let raw = self.raw(config);
        let ParseRule::Integer { min, max } = self.rule() else {
            return Err(InvalidStyleError::new(self.config_key(), raw, "not an integer field"));
        };
        let value: i64 = raw.trim().parse().map_err(|_| {
            InvalidStyleError::new(self.config_key(), raw, "expected an integer")
        })?;
        if value < min || value > max {
            let reason = if max == i32::MAX as i64 {
                format!("must be at least {}", min)
            } else {
                format!("must be between {} and {}", min, max)
            };
            return Err(InvalidStyleError::new(self.config_key(), raw, reason));
        }
        Ok(value)
    }

    fn parse_color(self, config: &StyleConfig) -> Result<AssColor, InvalidStyleError> {
        let raw = self.raw(config);
        AssColor::from_ass_string(raw).ok_or_else(|| {
            InvalidStyleError::new(self.config_key(), raw, "expected &HBBGGRR& or &HAABBGGRR")
        })
    }

    fn parse_text(self, config: &StyleConfig) -> Result<String, InvalidStyleError> {
        let raw = self.raw(config).trim();
        if raw.is_empty() {
            return Err(InvalidStyleError::new(self.config_key(), raw, "must not be empty"));
        }
        Ok(raw.to_string())
    }
}

/// Validated, typed style.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font: String,
    pub font_size: i32,
    pub primary_color: AssColor,
    pub outline_color: AssColor,
    pub back_color: AssColor,
    pub outline: i32,
    pub shadow: i32,
    pub margin_v: i32,
    pub margin_h: i32,
    pub alignment: u8,
    pub max_chars: i32,
}

impl ResolvedStyle {
    /// Validate every field of `config`.
    pub fn resolve(config: &StyleConfig) -> Result<Self, InvalidStyleError> {
        // bounds from the table keep the casts lossless
        Ok(Self {
            font: StyleField::Font.parse_text(config)?,
            font_size: StyleField::FontSize.parse_int(config)? as i32,
            primary_color: StyleField::PrimaryColor.parse_color(config)?,
            outline_color: StyleField::OutlineColor.parse_color(config)?,
            back_color: StyleField::BackColor.parse_color(config)?,
            outline: StyleField::Outline.parse_int(config)? as i32,
            shadow: StyleField::Shadow.parse_int(config)? as i32,
            margin_v: StyleField::MarginV.parse_int(config)? as i32,
            margin_h: StyleField::MarginH.parse_int(config)? as i32,
            alignment: StyleField::Alignment.parse_int(config)? as u8,
            max_chars: StyleField::MaxChars.parse_int(config)? as i32,
        })
    }

    /// The `Default` ASS style record.
    pub fn to_ass_style(&self) -> SubtitleStyle {
        SubtitleStyle {
            name: DEFAULT_STYLE_NAME.to_string(),
            fontname: self.font.clone(),
            fontsize: f64::from(self.font_size),
            primary_color: self.primary_color,
            outline_color: self.outline_color,
            back_color: self.back_color,
            outline: f64::from(self.outline),
            shadow: f64::from(self.shadow),
            alignment: i32::from(self.alignment),
            margin_l: self.margin_h,
            margin_r: self.margin_h,
            margin_v: self.margin_v,
            ..SubtitleStyle::default()
        }
    }
}

/// Applies one resolved style to cues.
#[derive(Debug, Clone)]
pub struct StyleProjector {
    style: ResolvedStyle,
}

impl StyleProjector {
    pub fn new(config: &StyleConfig) -> Result<Self, InvalidStyleError> {
        Ok(Self {
            style: ResolvedStyle::resolve(config)?,
        })
    }

    pub fn style(&self) -> &ResolvedStyle {
        &self.style
    }

    /// One cue: default style, cleaned text behind a single alignment directive.
    pub fn project_cue(&self, cue: &SubtitleCue, source_format: SubtitleFormat) -> SubtitleCue {
        let text = match source_format {
            SubtitleFormat::Srt => srt_to_ass_text(&cue.text),
            SubtitleFormat::Ass => cue.text.clone(),
        };
        SubtitleCue {
            text: with_alignment(&text, self.style.alignment),
            style: DEFAULT_STYLE_NAME.to_string(),
            ..cue.clone()
        }
    }

    /// Styled ASS document for `data`. Timing is not changed.
    pub fn project(&self, data: &SubtitleData) -> SubtitleData {
        let mut info = data.info.clone();
        info.wrap_style.get_or_insert(0);
        info.scaled_border_and_shadow.get_or_insert(true);

        SubtitleData {
            cues: data
                .cues
                .iter()
                .map(|c| self.project_cue(c, data.format))
                .collect(),
            styles: vec![self.style.to_ass_style()],
            info,
            format: SubtitleFormat::Ass,
            source_path: data.source_path.clone(),
        }
    }
}

/// Validate `config` and project it onto `data`.
pub fn project(data: &SubtitleData, config: &StyleConfig) -> Result<SubtitleData, InvalidStyleError> {
    Ok(StyleProjector::new(config)?.project(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_with(texts: &[&str], format: SubtitleFormat) -> SubtitleData {
        let mut data = SubtitleData::with_format(format);
        for (i, t) in texts.iter().enumerate() {
            let start = i as i64 * 1000;
            data.cues.push(SubtitleCue::new(start, start + 900, *t).with_style("Old"));
        }
        data
    }

    #[test]
    fn table_covers_every_field_once() {
        let mut keys: Vec<&str> = StyleField::ALL.iter().map(|f| f.config_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), StyleField::ALL.len());

        let json = serde_json::to_value(StyleConfig::default()).unwrap();
        // every field except the preset name is projected
        assert_eq!(json.as_object().unwrap().len(), StyleField::ALL.len() + 1);
        for key in keys {
            assert!(json.get(key).is_some(), "{} missing from StyleConfig", key);
        }
    }

    #[test]
    fn alignment_five_replaces_existing_markup() {
        let config = StyleConfig {
            alignment: "5".to_string(),
            ..StyleConfig::default()
        };
        let data = data_with(&["{\\an2}{\\an2}hello", "hello"], SubtitleFormat::Ass);

        let out = project(&data, &config).unwrap();

        assert_eq!(out.cues[0].text, "{\\an5}hello");
        assert_eq!(out.cues[1].text, "{\\an5}hello");
        assert!(out.cues.iter().all(|c| c.style == "Default"));
        assert_eq!(out.cues[0].start_ms, 0);
        assert_eq!(out.cues[1].end_ms, 1900);
    }

    #[test]
    fn default_style_record() {
        let out = project(&data_with(&["x"], SubtitleFormat::Srt), &StyleConfig::default()).unwrap();

        assert_eq!(out.format, SubtitleFormat::Ass);
        assert_eq!(out.styles.len(), 1);
        let s = &out.styles[0];
        assert_eq!(s.name, "Default");
        assert_eq!(s.fontname, "Arial");
        assert_eq!(s.fontsize, 48.0);
        assert_eq!(s.primary_color, AssColor::from_rgb(255, 255, 255));
        assert_eq!(s.outline_color, AssColor::from_rgb(0, 0, 0));
        assert_eq!(s.outline, 2.0);
        assert_eq!(s.shadow, 0.0);
        assert_eq!((s.margin_l, s.margin_r, s.margin_v), (20, 20, 20));
        assert_eq!(s.alignment, 2);
        assert_eq!(out.cues[0].text, "{\\an2}x");
    }

    #[test]
    fn horizontal_margin_is_symmetric() {
        let config = StyleConfig {
            margin_h: "64".to_string(),
            ..StyleConfig::default()
        };
        let style = ResolvedStyle::resolve(&config).unwrap().to_ass_style();
        assert_eq!(style.margin_l, 64);
        assert_eq!(style.margin_r, 64);
    }

    #[test]
    fn srt_markup_is_converted() {
        let out = project(
            &data_with(&["<i>quiet</i>\nline two"], SubtitleFormat::Srt),
            &StyleConfig::default(),
        )
        .unwrap();
        assert_eq!(out.cues[0].text, "{\\an2}{\\i1}quiet{\\i0}\\Nline two");
    }

    #[test]
    fn non_numeric_field_is_invalid() {
        let config = StyleConfig {
            font_size: "large".to_string(),
            ..StyleConfig::default()
        };
        let err = ResolvedStyle::resolve(&config).unwrap_err();
        assert_eq!(err.field, "font_size");
        assert_eq!(err.value, "large");
    }

    #[test]
    fn out_of_range_values_are_invalid() {
        for (alignment, ok) in [("0", false), ("1", true), ("9", true), ("10", false)] {
            let config = StyleConfig {
                alignment: alignment.to_string(),
                ..StyleConfig::default()
            };
            assert_eq!(ResolvedStyle::resolve(&config).is_ok(), ok, "alignment {}", alignment);
        }

        let config = StyleConfig {
            font_size: "0".to_string(),
            ..StyleConfig::default()
        };
        assert_eq!(ResolvedStyle::resolve(&config).unwrap_err().field, "font_size");

        let config = StyleConfig {
            shadow: "-1".to_string(),
            ..StyleConfig::default()
        };
        assert_eq!(ResolvedStyle::resolve(&config).unwrap_err().field, "shadow");
    }

    #[test]
    fn bad_color_is_invalid() {
        let config = StyleConfig {
            outline_color: "black".to_string(),
            ..StyleConfig::default()
        };
        assert_eq!(ResolvedStyle::resolve(&config).unwrap_err().field, "outline_color");
    }

    #[test]
    fn max_chars_is_validated_but_never_wraps() {
        let config = StyleConfig {
            max_chars: "5".to_string(),
            ..StyleConfig::default()
        };
        let long = "a sentence much longer than five characters";
        let out = project(&data_with(&[long], SubtitleFormat::Ass), &config).unwrap();
        assert_eq!(out.cues[0].text, format!("{{\\an2}}{}", long));

        let config = StyleConfig {
            max_chars: "forty".to_string(),
            ..StyleConfig::default()
        };
        assert!(ResolvedStyle::resolve(&config).is_err());
    }
}
