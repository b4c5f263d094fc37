//! SRT subtitle parser.
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! Hello, world!
//! ```
//!
//! The index line is optional and ignored. Text is everything after the
//! timing line up to the next blank line.

use crate::subtitles::error::ParseError;
use crate::subtitles::types::{SubtitleCue, SubtitleData, SubtitleFormat};

/// Parse SRT content into SubtitleData.
///
/// Content that is not blank but holds no timing line at all is an error.
pub fn parse_srt(content: &str) -> Result<SubtitleData, ParseError> {
    let mut data = SubtitleData::with_format(SubtitleFormat::Srt);

    let content = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut line_no = 0;
    let mut block: Vec<(usize, &str)> = Vec::new();

    for line in content.split('\n') {
        line_no += 1;
        if line.trim().is_empty() {
            flush_block(&mut block, &mut data)?;
        } else {
            block.push((line_no, line));
        }
    }
    flush_block(&mut block, &mut data)?;

    if data.cues.is_empty() && !content.trim().is_empty() {
        return Err(ParseError::at_line(1, "no SRT timing lines found"));
    }

    Ok(data)
}

fn flush_block(block: &mut Vec<(usize, &str)>, data: &mut SubtitleData) -> Result<(), ParseError> {
    let lines = std::mem::take(block);

    let Some(timing_idx) = lines.iter().position(|(_, l)| l.contains("-->")) else {
        return Ok(());
    };
    let (timing_line_no, timing_line) = lines[timing_idx];

    let (start_ms, end_ms) = parse_srt_timing(timing_line)
        .ok_or_else(|| ParseError::invalid_time(timing_line_no, timing_line.trim()))?;

    let text = lines[timing_idx + 1..]
        .iter()
        .map(|(_, l)| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    if !text.is_empty() {
        data.cues.push(SubtitleCue::new(start_ms, end_ms, text));
    }
    Ok(())
}

/// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm` (extra position hints after the end
/// time are ignored).
fn parse_srt_timing(line: &str) -> Option<(i64, i64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_srt_time(start)?, parse_srt_time(end)?))
}

/// Parse an SRT timestamp `HH:MM:SS,mmm` (a period separator is accepted).
///
/// Returns whole milliseconds; digits beyond the third are truncated.
pub fn parse_srt_time(s: &str) -> Option<i64> {
    let s = s.trim();
    let (hms, frac) = match s.find([',', '.']) {
        Some(pos) => (&s[..pos], &s[pos + 1..]),
        None => (s, ""),
    };

    let mut parts = hms.split(':');
    let hours: i64 = parts.next()?.trim().parse().ok()?;
    let minutes: i64 = parts.next()?.trim().parse().ok()?;
    let seconds: i64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || hours < 0 || minutes < 0 || seconds < 0 {
        return None;
    }

    hms_to_ms(hours, minutes, seconds, parse_fraction_ms(frac)?)
}

/// Combine timestamp fields into milliseconds; `None` when out of range.
pub(crate) fn hms_to_ms(hours: i64, minutes: i64, seconds: i64, millis: i64) -> Option<i64> {
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes.checked_mul(60_000)?)?
        .checked_add(seconds.checked_mul(1000)?)?
        .checked_add(millis)
}

/// Fractional seconds digits to milliseconds ("5" = 500, "05" = 50).
pub(crate) fn parse_fraction_ms(frac: &str) -> Option<i64> {
    if frac.is_empty() {
        return Some(0);
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits: String = frac.chars().chain("000".chars()).take(3).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamps() {
        assert_eq!(parse_srt_time("00:00:00,000"), Some(0));
        assert_eq!(parse_srt_time("00:00:01,500"), Some(1500));
        assert_eq!(parse_srt_time("00:01:00,000"), Some(60_000));
        assert_eq!(parse_srt_time("01:00:00,000"), Some(3_600_000));
        assert_eq!(parse_srt_time("00:00:01.5"), Some(1500));
        assert_eq!(parse_srt_time("00:00:01,2345"), Some(1234));
        assert_eq!(parse_srt_time("00:00:01"), Some(1000));
        assert_eq!(parse_srt_time("1:2"), None);
        assert_eq!(parse_srt_time("aa:00:01,000"), None);
    }

    #[test]
    fn parses_basic_file() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\nHello, world!\n\n\
                       2\n00:00:05,000 --> 00:00:08,000\nThis is a test.\nWith two lines.\n\n\
                       3\n00:00:09,000 --> 00:00:12,000\nFinal.\n";

        let data = parse_srt(content).unwrap();

        assert_eq!(data.format, SubtitleFormat::Srt);
        assert_eq!(data.cues.len(), 3);
        assert_eq!(data.cues[0].start_ms, 1000);
        assert_eq!(data.cues[0].end_ms, 4000);
        assert_eq!(data.cues[0].text, "Hello, world!");
        assert_eq!(data.cues[1].text, "This is a test.\nWith two lines.");
        assert_eq!(data.cues[2].start_ms, 9000);
    }

    #[test]
    fn tolerates_missing_index_crlf_and_bom() {
        let content = "\u{feff}00:00:01,000 --> 00:00:04,000\r\nHello\r\n\r\n\r\n\
                       00:00:05,000 --> 00:00:08,000\r\nAgain\r\n";
        let data = parse_srt(content).unwrap();
        assert_eq!(data.cues.len(), 2);
        assert_eq!(data.cues[1].text, "Again");
    }

    #[test]
    fn keeps_html_formatting() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\n<i>Italic</i>\n";
        let data = parse_srt(content).unwrap();
        assert_eq!(data.cues[0].text, "<i>Italic</i>");
    }

    #[test]
    fn bad_timing_is_an_error() {
        let content = "1\n00:00:xx,000 --> 00:00:04,000\nHello\n";
        let err = parse_srt(content).unwrap_err();
        assert!(matches!(err, ParseError::InvalidTime { line: 2, .. }));
    }

    #[test]
    fn overflowing_timestamp_is_an_error() {
        assert_eq!(parse_srt_time("9999999999999:00:00,000"), None);
        assert_eq!(parse_srt_time("0:0:9223372036854775807,000"), None);

        let content = "1\n9999999999999:00:00,000 --> 9999999999999:00:01,000\nHuge\n";
        let err = parse_srt(content).unwrap_err();
        assert!(matches!(err, ParseError::InvalidTime { line: 2, .. }));
    }

    #[test]
    fn non_subtitle_text_is_an_error() {
        assert!(parse_srt("just some notes\nnothing timed\n").is_err());
        assert!(parse_srt("").unwrap().cues.is_empty());
    }
}
