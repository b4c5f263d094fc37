//! ASS/SSA subtitle parser.
//!
//! Reads `[Script Info]`, `[V4+ Styles]` / `[V4 Styles]` and `[Events]`.
//! Field order comes from each section's `Format:` line; the standard
//! order is assumed when it is missing.

use crate::subtitles::error::ParseError;
use crate::subtitles::types::{
    AssColor, ScriptInfo, SubtitleCue, SubtitleData, SubtitleFormat, SubtitleStyle,
};

use super::srt::{hms_to_ms, parse_fraction_ms};

#[derive(Debug, PartialEq)]
enum Section {
    ScriptInfo,
    Styles,
    Events,
    Other,
}

/// Parse ASS/SSA content into SubtitleData.
pub fn parse_ass(content: &str) -> Result<SubtitleData, ParseError> {
    let mut data = SubtitleData::with_format(SubtitleFormat::Ass);
    let mut section = Section::Other;
    let mut style_format: Vec<String> = default_style_format();
    let mut event_format: Vec<String> = default_event_format();

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim_start_matches('\u{feff}').trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with('!') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = match line[1..line.len() - 1].to_lowercase().as_str() {
                "script info" => Section::ScriptInfo,
                "v4+ styles" | "v4 styles" => Section::Styles,
                "events" => Section::Events,
                _ => Section::Other,
            };
            continue;
        }

        match section {
            Section::ScriptInfo => parse_script_info_line(line, &mut data.info),
            Section::Styles => {
                if let Some(rest) = line.strip_prefix("Format:") {
                    style_format = parse_format_fields(rest);
                } else if let Some(rest) = line.strip_prefix("Style:") {
                    data.styles.push(parse_style_line(rest, &style_format, line_num)?);
                }
            }
            Section::Events => {
                if let Some(rest) = line.strip_prefix("Format:") {
                    event_format = parse_format_fields(rest);
                } else if let Some(rest) = line.strip_prefix("Dialogue:") {
                    data.cues.push(parse_event_line(rest, &event_format, false, line_num)?);
                } else if let Some(rest) = line.strip_prefix("Comment:") {
                    data.cues.push(parse_event_line(rest, &event_format, true, line_num)?);
                }
            }
            // fonts, graphics and unknown sections are skipped
            Section::Other => {}
        }
    }

    if data.styles.is_empty() {
        data.styles.push(SubtitleStyle::default());
    }

    Ok(data)
}

fn parse_format_fields(rest: &str) -> Vec<String> {
    rest.split(',').map(|s| s.trim().to_lowercase()).collect()
}

fn parse_script_info_line(line: &str, info: &mut ScriptInfo) {
    let Some((key, value)) = line.split_once(':') else {
        return;
    };
    let value = value.trim();

    match key.trim().to_lowercase().as_str() {
        "title" => info.title = Some(value.to_string()),
        "playresx" => info.play_res_x = value.parse().ok(),
        "playresy" => info.play_res_y = value.parse().ok(),
        "wrapstyle" => info.wrap_style = value.parse().ok(),
        "scaledborderandshadow" => {
            info.scaled_border_and_shadow = Some(value.eq_ignore_ascii_case("yes") || value == "1")
        }
        // regenerated on write
        "scripttype" => {}
        _ => {
            info.custom.insert(key.trim().to_string(), value.to_string());
        }
    }
}

fn parse_style_line(
    rest: &str,
    format: &[String],
    line_num: usize,
) -> Result<SubtitleStyle, ParseError> {
    let fields: Vec<&str> = rest.trim().split(',').map(str::trim).collect();

    if fields.len() < format.len() {
        return Err(ParseError::invalid_style(
            line_num,
            format!("Expected {} fields, got {}", format.len(), fields.len()),
        ));
    }

    let flag = |v: &str| v == "-1" || v == "1";
    let color = |v: &str| {
        AssColor::from_ass_string(v)
            .ok_or_else(|| ParseError::invalid_style(line_num, format!("bad color '{}'", v)))
    };

    let mut style = SubtitleStyle::default();
    for (name, value) in format.iter().zip(fields) {
        match name.as_str() {
            "name" => style.name = value.to_string(),
            "fontname" => style.fontname = value.to_string(),
            "fontsize" => style.fontsize = value.parse().unwrap_or(style.fontsize),
            "primarycolour" => style.primary_color = color(value)?,
            "secondarycolour" => style.secondary_color = color(value)?,
            "outlinecolour" | "tertiarycolour" => style.outline_color = color(value)?,
            "backcolour" => style.back_color = color(value)?,
            "bold" => style.bold = flag(value),
            "italic" => style.italic = flag(value),
            "underline" => style.underline = flag(value),
            "strikeout" => style.strikeout = flag(value),
            "scalex" => style.scale_x = value.parse().unwrap_or(100.0),
            "scaley" => style.scale_y = value.parse().unwrap_or(100.0),
            "spacing" => style.spacing = value.parse().unwrap_or(0.0),
            "angle" => style.angle = value.parse().unwrap_or(0.0),
            "borderstyle" => style.border_style = value.parse().unwrap_or(1),
            "outline" => style.outline = value.parse().unwrap_or(style.outline),
            "shadow" => style.shadow = value.parse().unwrap_or(style.shadow),
            "alignment" => style.alignment = value.parse().unwrap_or(2),
            "marginl" => style.margin_l = value.parse().unwrap_or(style.margin_l),
            "marginr" => style.margin_r = value.parse().unwrap_or(style.margin_r),
            "marginv" => style.margin_v = value.parse().unwrap_or(style.margin_v),
            "encoding" => style.encoding = value.parse().unwrap_or(1),
            _ => {}
        }
    }

    Ok(style)
}

fn parse_event_line(
    rest: &str,
    format: &[String],
    is_comment: bool,
    line_num: usize,
) -> Result<SubtitleCue, ParseError> {
    // text is last and may itself contain commas
    let text_index = format
        .iter()
        .position(|f| f == "text")
        .unwrap_or(format.len().saturating_sub(1));
    let parts: Vec<&str> = rest.trim_start().splitn(text_index + 1, ',').collect();

    if parts.len() <= text_index {
        return Err(ParseError::invalid_event(
            line_num,
            format!("Expected {} fields, got {}", text_index + 1, parts.len()),
        ));
    }

    let mut cue = SubtitleCue {
        is_comment,
        ..Default::default()
    };
    let mut start = None;
    let mut end = None;

    for (name, value) in format.iter().zip(parts) {
        let trimmed = value.trim();
        match name.as_str() {
            "layer" | "marked" => cue.layer = trimmed.parse().unwrap_or(0),
            "start" => {
                start = Some(
                    parse_ass_time(trimmed)
                        .ok_or_else(|| ParseError::invalid_time(line_num, trimmed))?,
                )
            }
            "end" => {
                end = Some(
                    parse_ass_time(trimmed)
                        .ok_or_else(|| ParseError::invalid_time(line_num, trimmed))?,
                )
            }
            "style" => cue.style = trimmed.trim_start_matches('*').to_string(),
            "name" | "actor" => cue.actor = trimmed.to_string(),
            "effect" => cue.effect = trimmed.to_string(),
            "text" => cue.text = value.to_string(),
            _ => {}
        }
    }

    let (Some(start_ms), Some(end_ms)) = (start, end) else {
        return Err(ParseError::invalid_event(line_num, "missing start or end time"));
    };
    cue.start_ms = start_ms;
    cue.end_ms = end_ms.max(start_ms);

    Ok(cue)
}

/// Parse an ASS timestamp `H:MM:SS.cc` into milliseconds.
pub fn parse_ass_time(s: &str) -> Option<i64> {
    let (hms, frac) = s.trim().split_once('.').unwrap_or((s.trim(), ""));

    let mut parts = hms.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || hours < 0 || minutes < 0 || seconds < 0 {
        return None;
    }

    hms_to_ms(hours, minutes, seconds, parse_fraction_ms(frac)?)
}

fn default_style_format() -> Vec<String> {
    [
        "name",
        "fontname",
        "fontsize",
        "primarycolour",
        "secondarycolour",
        "outlinecolour",
        "backcolour",
        "bold",
        "italic",
        "underline",
        "strikeout",
        "scalex",
        "scaley",
        "spacing",
        "angle",
        "borderstyle",
        "outline",
        "shadow",
        "alignment",
        "marginl",
        "marginr",
        "marginv",
        "encoding",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_event_format() -> Vec<String> {
    [
        "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[Script Info]
Title: Hook lines
PlayResX: 1080
PlayResY: 1920

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,48,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,0,2,20,20,20,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,Hello, world!
Dialogue: 0,0:00:05.50,0:00:08.00,Default,,0,0,0,,{\i1}This{\i0} is a test.
Comment: 0,0:00:09.00,0:00:10.00,Default,,0,0,0,,note to self
"#;

    #[test]
    fn parses_timestamps() {
        assert_eq!(parse_ass_time("0:00:00.00"), Some(0));
        assert_eq!(parse_ass_time("0:00:01.50"), Some(1500));
        assert_eq!(parse_ass_time("0:00:00.01"), Some(10));
        assert_eq!(parse_ass_time("0:01:00.00"), Some(60_000));
        assert_eq!(parse_ass_time("1:00:00.00"), Some(3_600_000));
        assert_eq!(parse_ass_time("0:00:02.345"), Some(2345));
        assert_eq!(parse_ass_time("0:00"), None);
    }

    #[test]
    fn parses_sections() {
        let data = parse_ass(SAMPLE).unwrap();

        assert_eq!(data.info.title.as_deref(), Some("Hook lines"));
        assert_eq!(data.info.play_res_y, Some(1920));

        assert_eq!(data.styles.len(), 1);
        let style = &data.styles[0];
        assert_eq!(style.fontname, "Arial");
        assert_eq!(style.fontsize, 48.0);
        assert!(style.bold);
        assert_eq!(style.margin_v, 20);

        assert_eq!(data.cues.len(), 3);
        assert_eq!(data.cues[0].text, "Hello, world!");
        assert_eq!(data.cues[1].start_ms, 5500);
        assert_eq!(data.cues[1].text, "{\\i1}This{\\i0} is a test.");
        assert!(data.cues[2].is_comment);
        assert_eq!(data.dialogue_count(), 2);
    }

    #[test]
    fn missing_styles_get_default() {
        let content = "[Events]\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,x\n";
        let data = parse_ass(content).unwrap();
        assert_eq!(data.styles.len(), 1);
        assert_eq!(data.cues.len(), 1);
    }

    #[test]
    fn bad_event_time_is_an_error() {
        let content = "[Events]\nDialogue: 0,zero,0:00:02.00,Default,,0,0,0,,x\n";
        assert!(matches!(
            parse_ass(content).unwrap_err(),
            ParseError::InvalidTime { line: 2, .. }
        ));
    }

    #[test]
    fn overflowing_event_time_is_an_error() {
        assert_eq!(parse_ass_time("9999999999999:00:00.00"), None);

        let content = "[Events]\nDialogue: 0,9999999999999:00:00.00,0:00:02.00,Default,,0,0,0,,x\n";
        assert!(matches!(
            parse_ass(content).unwrap_err(),
            ParseError::InvalidTime { line: 2, .. }
        ));
    }

    #[test]
    fn truncated_event_is_an_error() {
        let content = "[Events]\nDialogue: 0,0:00:01.00\n";
        assert!(matches!(
            parse_ass(content).unwrap_err(),
            ParseError::InvalidEvent { .. }
        ));
    }
}
