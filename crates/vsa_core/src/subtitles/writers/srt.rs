//! SRT subtitle writer.

use crate::subtitles::types::{SubtitleCue, SubtitleData};

/// Write SubtitleData as SRT. Comments are skipped and indices regenerated.
pub fn write_srt(data: &SubtitleData) -> String {
    let mut output = String::new();

    let dialogue: Vec<&SubtitleCue> = data.cues.iter().filter(|c| !c.is_comment).collect();

    for (i, cue) in dialogue.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start_ms),
            format_srt_time(cue.end_ms)
        ));
        output.push_str(&cue.text.replace("\\N", "\n"));
        output.push('\n');
    }

    output
}

/// Format milliseconds as `HH:MM:SS,mmm`.
pub fn format_srt_time(ms: i64) -> String {
    let ms = ms.max(0);
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::parsers::parse_srt;

    #[test]
    fn formats_time() {
        assert_eq!(format_srt_time(0), "00:00:00,000");
        assert_eq!(format_srt_time(1500), "00:00:01,500");
        assert_eq!(format_srt_time(3_723_004), "01:02:03,004");
        assert_eq!(format_srt_time(-5), "00:00:00,000");
    }

    #[test]
    fn writes_and_reparses() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\nHello\n\n2\n00:00:05,250 --> 00:00:08,000\nTwo\nlines\n";
        let data = parse_srt(content).unwrap();
        let written = write_srt(&data);
        assert_eq!(written, content);
    }

    #[test]
    fn skips_comments() {
        let mut data = SubtitleData::new();
        data.cues.push(SubtitleCue::new(0, 1000, "kept"));
        data.cues.push(SubtitleCue {
            is_comment: true,
            ..SubtitleCue::new(1000, 2000, "dropped")
        });
        let out = write_srt(&data);
        assert!(out.contains("kept"));
        assert!(!out.contains("dropped"));
    }
}
