//! ASS subtitle writer.
//!
//! Emits `[Script Info]`, `[V4+ Styles]` and `[Events]` with the standard
//! field order. Times are written in centiseconds using the configured
//! rounding mode.

use std::fmt::Write;

use crate::subtitles::types::{SubtitleCue, SubtitleData, SubtitleStyle, WriteOptions, RoundingMode};

const STYLE_FORMAT: &str = "Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str = "Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Write SubtitleData as an ASS document.
pub fn write_ass(data: &SubtitleData, options: &WriteOptions) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    if let Some(ref title) = data.info.title {
        let _ = writeln!(out, "Title: {}", title);
    }
    out.push_str("ScriptType: v4.00+\n");
    if let Some(x) = data.info.play_res_x {
        let _ = writeln!(out, "PlayResX: {}", x);
    }
    if let Some(y) = data.info.play_res_y {
        let _ = writeln!(out, "PlayResY: {}", y);
    }
    if let Some(w) = data.info.wrap_style {
        let _ = writeln!(out, "WrapStyle: {}", w);
    }
    if let Some(s) = data.info.scaled_border_and_shadow {
        let _ = writeln!(out, "ScaledBorderAndShadow: {}", if s { "yes" } else { "no" });
    }
    for (key, value) in &data.info.custom {
        let _ = writeln!(out, "{}: {}", key, value);
    }

    out.push_str("\n[V4+ Styles]\n");
    let _ = writeln!(out, "Format: {}", STYLE_FORMAT);
    for style in &data.styles {
        out.push_str(&format_style_line(style));
        out.push('\n');
    }

    out.push_str("\n[Events]\n");
    let _ = writeln!(out, "Format: {}", EVENT_FORMAT);
    for cue in &data.cues {
        out.push_str(&format_event_line(cue, options.rounding));
        out.push('\n');
    }

    out
}

/// Format milliseconds as `H:MM:SS.cc`.
pub fn format_ass_time(ms: i64, rounding: RoundingMode) -> String {
    let cs = rounding.to_centiseconds(ms.max(0));
    let centis = cs % 100;
    let total_secs = cs / 100;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!("{}:{:02}:{:02}.{:02}", hours, mins, secs, centis)
}

fn format_style_line(s: &SubtitleStyle) -> String {
    let flag = |b: bool| if b { "-1" } else { "0" };
    format!(
        "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        s.name,
        s.fontname,
        format_number(s.fontsize),
        s.primary_color.to_ass_string(),
        s.secondary_color.to_ass_string(),
        s.outline_color.to_ass_string(),
        s.back_color.to_ass_string(),
        flag(s.bold),
        flag(s.italic),
        flag(s.underline),
        flag(s.strikeout),
        format_number(s.scale_x),
        format_number(s.scale_y),
        format_number(s.spacing),
        format_number(s.angle),
        s.border_style,
        format_number(s.outline),
        format_number(s.shadow),
        s.alignment,
        s.margin_l,
        s.margin_r,
        s.margin_v,
        s.encoding,
    )
}

fn format_event_line(cue: &SubtitleCue, rounding: RoundingMode) -> String {
    format!(
        "{}: {},{},{},{},{},0,0,0,{},{}",
        if cue.is_comment { "Comment" } else { "Dialogue" },
        cue.layer,
        format_ass_time(cue.start_ms, rounding),
        format_ass_time(cue.end_ms, rounding),
        cue.style,
        cue.actor,
        cue.effect,
        cue.text.replace('\n', "\\N"),
    )
}

/// Whole numbers without a fractional part, as style editors write them.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::parsers::parse_ass;
    use crate::subtitles::types::AssColor;

    #[test]
    fn formats_time() {
        assert_eq!(format_ass_time(0, RoundingMode::Round), "0:00:00.00");
        assert_eq!(format_ass_time(1234, RoundingMode::Round), "0:00:01.23");
        assert_eq!(format_ass_time(1235, RoundingMode::Round), "0:00:01.24");
        assert_eq!(format_ass_time(1239, RoundingMode::Floor), "0:00:01.23");
        assert_eq!(format_ass_time(3_723_450, RoundingMode::Round), "1:02:03.45");
    }

    #[test]
    fn writes_styles_and_events() {
        let mut data = SubtitleData::new();
        let mut style = SubtitleStyle::default();
        style.fontsize = 48.0;
        style.primary_color = AssColor::from_rgb(255, 255, 0);
        style.margin_l = 20;
        style.margin_r = 20;
        data.set_style(style);
        data.cues
            .push(SubtitleCue::new(10_534, 12_000, "{\\an5}first\nsecond"));

        let out = write_ass(&data, &WriteOptions::default());

        assert!(out.starts_with("[Script Info]\nScriptType: v4.00+\n"));
        assert!(out.contains(
            "Style: Default,Arial,48,&H0000FFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,20,20,10,1"
        ));
        assert!(out.contains("Dialogue: 0,0:00:10.53,0:00:12.00,Default,,0,0,0,,{\\an5}first\\Nsecond"));
    }

    #[test]
    fn output_parses_back() {
        let mut data = SubtitleData::new();
        data.styles.push(SubtitleStyle::default());
        data.cues.push(SubtitleCue::new(1000, 2500, "a, with comma"));

        let reparsed = parse_ass(&write_ass(&data, &WriteOptions::default())).unwrap();
        assert_eq!(reparsed.styles, data.styles);
        assert_eq!(reparsed.cues[0].text, "a, with comma");
        assert_eq!(reparsed.cues[0].end_ms, 2500);
    }
}
