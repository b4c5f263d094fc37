//! Core subtitle types.
//!
//! All timing values are whole milliseconds. Rounding to centiseconds (ASS)
//! happens only at write time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Supported subtitle formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubtitleFormat {
    /// Advanced SubStation Alpha (.ass, .ssa)
    #[default]
    Ass,
    /// SubRip (.srt)
    Srt,
}

impl SubtitleFormat {
    /// Detect format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "ass" | "ssa" => Some(Self::Ass),
            "srt" => Some(Self::Srt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ass => "ass",
            Self::Srt => "srt",
        }
    }
}

/// A loaded cue set with its styles and header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleData {
    pub cues: Vec<SubtitleCue>,
    /// ASS styles (empty for SRT).
    pub styles: Vec<SubtitleStyle>,
    pub info: ScriptInfo,
    /// Format the cue text is written in.
    pub format: SubtitleFormat,
    pub source_path: Option<PathBuf>,
}

impl SubtitleData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: SubtitleFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// Number of dialogue cues (excluding comments).
    pub fn dialogue_count(&self) -> usize {
        self.cues.iter().filter(|c| !c.is_comment).count()
    }

    /// End of the last cue in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.cues.iter().map(|c| c.end_ms).max().unwrap_or(0)
    }

    /// Add or replace a style by name.
    pub fn set_style(&mut self, style: SubtitleStyle) {
        match self.styles.iter_mut().find(|s| s.name == style.name) {
            Some(existing) => *existing = style,
            None => self.styles.push(style),
        }
    }

    /// Shift every cue by `offset_ms`.
    pub fn shift_all(&mut self, offset_ms: i64) {
        for cue in &mut self.cues {
            cue.shift(offset_ms);
        }
    }

    /// Stable sort by start time.
    pub fn sort_by_start(&mut self) {
        self.cues.sort_by_key(|c| c.start_ms);
    }

    /// True when cue starts never decrease.
    pub fn is_time_ordered(&self) -> bool {
        self.cues.windows(2).all(|w| w[0].start_ms <= w[1].start_ms)
    }
}

/// One timed subtitle line.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub start_ms: i64,
    pub end_ms: i64,
    /// Text content (may contain override blocks).
    pub text: String,
    /// Style name the cue renders with.
    pub style: String,
    /// Layer number (ASS only).
    pub layer: i32,
    pub is_comment: bool,
    /// Actor/speaker name (ASS only).
    pub actor: String,
    /// Effect field (ASS only).
    pub effect: String,
}

impl Default for SubtitleCue {
    fn default() -> Self {
        Self {
            start_ms: 0,
            end_ms: 0,
            text: String::new(),
            style: DEFAULT_STYLE_NAME.to_string(),
            layer: 0,
            is_comment: false,
            actor: String::new(),
            effect: String::new(),
        }
    }
}

impl SubtitleCue {
    /// Create a dialogue cue. `end_ms` is raised to `start_ms` if earlier.
    pub fn new(start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms: end_ms.max(start_ms),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    pub fn shift(&mut self, offset_ms: i64) {
        self.start_ms = self.start_ms.saturating_add(offset_ms);
        self.end_ms = self.end_ms.saturating_add(offset_ms);
    }
}

/// Name of the style every projected cue uses.
pub const DEFAULT_STYLE_NAME: &str = "Default";

/// ASS style record.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleStyle {
    pub name: String,
    pub fontname: String,
    pub fontsize: f64,
    pub primary_color: AssColor,
    pub secondary_color: AssColor,
    pub outline_color: AssColor,
    pub back_color: AssColor,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    /// Horizontal scale (100 = normal).
    pub scale_x: f64,
    /// Vertical scale (100 = normal).
    pub scale_y: f64,
    pub spacing: f64,
    pub angle: f64,
    /// Border style (1 = outline + shadow, 3 = opaque box).
    pub border_style: i32,
    pub outline: f64,
    pub shadow: f64,
    /// Alignment (numpad style: 1-9).
    pub alignment: i32,
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    pub encoding: i32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            name: DEFAULT_STYLE_NAME.to_string(),
            fontname: "Arial".to_string(),
            fontsize: 20.0,
            primary_color: AssColor::from_rgb(255, 255, 255),
            secondary_color: AssColor::from_rgb(255, 0, 0),
            outline_color: AssColor::from_rgb(0, 0, 0),
            back_color: AssColor::from_rgb(0, 0, 0),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 2.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}

impl SubtitleStyle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// ASS color. Written as `&HAABBGGRR` (alpha, blue, green, red).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0 = opaque, 255 = transparent.
    pub a: u8,
}

impl Default for AssColor {
    fn default() -> Self {
        Self::from_rgb(255, 255, 255)
    }
}

impl AssColor {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0 }
    }

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `&HAABBGGRR`, `&HBBGGRR` or the legacy `&HBBGGRR&`.
    pub fn from_ass_string(s: &str) -> Option<Self> {
        let s = s.trim();
        let hex = s
            .strip_prefix("&H")
            .or_else(|| s.strip_prefix("&h"))?
            .trim_end_matches('&');

        if hex.is_empty() || hex.len() > 8 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;

        Some(Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
            a: if hex.len() > 6 {
                ((value >> 24) & 0xFF) as u8
            } else {
                0
            },
        })
    }

    pub fn to_ass_string(&self) -> String {
        format!("&H{:02X}{:02X}{:02X}{:02X}", self.a, self.b, self.g, self.r)
    }
}

/// `[Script Info]` header values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptInfo {
    pub title: Option<String>,
    pub play_res_x: Option<i32>,
    pub play_res_y: Option<i32>,
    pub wrap_style: Option<i32>,
    pub scaled_border_and_shadow: Option<bool>,
    /// Any other key, kept for round-trip.
    pub custom: BTreeMap<String, String>,
}

/// Rounding mode for ASS centisecond timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    Floor,
    #[default]
    Round,
    Ceil,
}

impl RoundingMode {
    /// Milliseconds to centiseconds.
    pub fn to_centiseconds(&self, ms: i64) -> i64 {
        let whole = ms.div_euclid(10);
        let rem = ms.rem_euclid(10);
        match self {
            Self::Floor => whole,
            Self::Round if rem >= 5 => whole + 1,
            Self::Round => whole,
            Self::Ceil if rem > 0 => whole + 1,
            Self::Ceil => whole,
        }
    }
}

/// Options for writing subtitle files.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub rounding: RoundingMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_saturates_at_the_end_of_time() {
        let mut cue = SubtitleCue::new(i64::MAX - 10, i64::MAX - 5, "late");
        cue.shift(3_500);
        assert_eq!(cue.start_ms, i64::MAX);
        assert_eq!(cue.end_ms, i64::MAX);

        let mut cue = SubtitleCue::new(1_000, 3_000, "early");
        cue.shift(3_500);
        assert_eq!((cue.start_ms, cue.end_ms), (4_500, 6_500));
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            SubtitleFormat::from_extension(Path::new("a.ASS")),
            Some(SubtitleFormat::Ass)
        );
        assert_eq!(
            SubtitleFormat::from_extension(Path::new("story_audio.srt")),
            Some(SubtitleFormat::Srt)
        );
        assert_eq!(SubtitleFormat::from_extension(Path::new("a.vtt")), None);
    }

    #[test]
    fn parses_colors() {
        let white = AssColor::from_ass_string("&H00FFFFFF").unwrap();
        assert_eq!(white, AssColor::from_rgb(255, 255, 255));

        // legacy form with trailing ampersand, BGR order
        let red = AssColor::from_ass_string("&H0000FF&").unwrap();
        assert_eq!(red, AssColor::from_rgb(255, 0, 0));

        let translucent = AssColor::from_ass_string("&H80000000").unwrap();
        assert_eq!(translucent.a, 0x80);

        assert!(AssColor::from_ass_string("white").is_none());
        assert!(AssColor::from_ass_string("&H").is_none());
        assert!(AssColor::from_ass_string("&HZZZZZZ").is_none());
        assert!(AssColor::from_ass_string("&H123456789").is_none());
    }

    #[test]
    fn color_string_roundtrip() {
        let c = AssColor::from_rgba(255, 128, 64, 32);
        assert_eq!(c.to_ass_string(), "&H204080FF");
        assert_eq!(AssColor::from_ass_string(&c.to_ass_string()), Some(c));
    }

    #[test]
    fn cue_end_never_before_start() {
        let cue = SubtitleCue::new(2000, 1000, "x");
        assert_eq!(cue.end_ms, 2000);
    }

    #[test]
    fn sort_is_stable() {
        let mut data = SubtitleData::new();
        data.cues.push(SubtitleCue::new(500, 900, "b1"));
        data.cues.push(SubtitleCue::new(100, 200, "a"));
        data.cues.push(SubtitleCue::new(500, 600, "b2"));
        data.sort_by_start();

        let texts: Vec<&str> = data.cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b1", "b2"]);
        assert!(data.is_time_ordered());
    }

    #[test]
    fn centisecond_rounding() {
        assert_eq!(RoundingMode::Floor.to_centiseconds(1234), 123);
        assert_eq!(RoundingMode::Round.to_centiseconds(1234), 123);
        assert_eq!(RoundingMode::Round.to_centiseconds(1235), 124);
        assert_eq!(RoundingMode::Ceil.to_centiseconds(1231), 124);
        assert_eq!(RoundingMode::Ceil.to_centiseconds(1230), 123);
    }
}
