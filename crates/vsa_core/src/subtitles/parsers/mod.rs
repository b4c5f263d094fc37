//! Subtitle parsers.
//!
//! Each parser is a pure function that takes content and returns `SubtitleData`.

mod ass;
mod srt;

pub use ass::{parse_ass, parse_ass_time};
pub use srt::{parse_srt, parse_srt_time};

use crate::subtitles::error::ParseError;
use crate::subtitles::types::{SubtitleData, SubtitleFormat};

/// Parse subtitle content, detecting the format from content if not given.
pub fn parse_content(
    content: &str,
    format: Option<SubtitleFormat>,
) -> Result<SubtitleData, ParseError> {
    match format.unwrap_or_else(|| detect_format(content)) {
        SubtitleFormat::Ass => parse_ass(content),
        SubtitleFormat::Srt => parse_srt(content),
    }
}

fn detect_format(content: &str) -> SubtitleFormat {
    let lower = content.to_lowercase();
    if lower.contains("[script info]")
        || lower.contains("[v4+ styles]")
        || lower.contains("[v4 styles]")
        || lower.contains("[events]")
    {
        SubtitleFormat::Ass
    } else {
        SubtitleFormat::Srt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_ass() {
        assert_eq!(detect_format("[Script Info]\nTitle: x\n"), SubtitleFormat::Ass);
    }

    #[test]
    fn falls_back_to_srt() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\nHello\n";
        assert_eq!(detect_format(content), SubtitleFormat::Srt);
        assert_eq!(parse_content(content, None).unwrap().cues.len(), 1);
    }
}
