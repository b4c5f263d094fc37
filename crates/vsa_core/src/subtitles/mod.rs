//! Subtitle processing.
//!
//! - **types**: cue model (`SubtitleData`, `SubtitleCue`, `SubtitleStyle`)
//! - **parsers** / **writers**: SRT and ASS, pure string functions
//! - **merge**: multi-source timeline merge with per-source offsets
//! - **markup**: positioning-tag cleanup and SRT to ASS text conversion
//! - **style**: preset projection onto the `Default` style and cue text
//!
//! # Usage
//!
//! ```ignore
//! use vsa_core::subtitles::{merge, project, write_file, SubtitleSource, WriteOptions};
//!
//! let merged = merge(&[
//!     SubtitleSource::new("story_hook.srt", 0.0),
//!     SubtitleSource::new("story_audio.srt", hook_secs),
//! ])?;
//! if let Some(data) = merged {
//!     let styled = project(&data, &preset)?;
//!     write_file(&styled, "subtitles_1700000000000.ass", &WriteOptions::default())?;
//! }
//! ```

mod error;
pub mod markup;
mod merge;
pub mod parsers;
mod style;
mod types;
pub mod writers;

use std::fs;
use std::path::Path;

pub use types::{
    AssColor, RoundingMode, ScriptInfo, SubtitleCue, SubtitleData, SubtitleFormat, SubtitleStyle,
    WriteOptions, DEFAULT_STYLE_NAME,
};

pub use error::{InvalidStyleError, ParseError, SubtitleError, SubtitleLoadError};

pub use parsers::{parse_ass, parse_ass_time, parse_content, parse_srt, parse_srt_time};

pub use writers::{format_ass_time, format_srt_time, write_ass, write_content, write_srt};

pub use merge::{merge, merge_loaded, offset_to_ms, SubtitleSource};
pub use style::{project, ParseRule, ResolvedStyle, StyleField, StyleProjector};

/// Parse a subtitle file, detecting the format from the extension first
/// and the content second.
pub fn parse_file(path: impl AsRef<Path>) -> Result<SubtitleData, SubtitleError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|e| SubtitleError::read(path, e))?;
    let content = String::from_utf8_lossy(&bytes);

    let mut data = parse_content(&content, SubtitleFormat::from_extension(path))?;
    data.source_path = Some(path.to_path_buf());

    Ok(data)
}

/// Write subtitle data; the extension picks the format, else the data's own.
pub fn write_file(
    data: &SubtitleData,
    path: impl AsRef<Path>,
    options: &WriteOptions,
) -> Result<(), SubtitleError> {
    let path = path.as_ref();
    let format = SubtitleFormat::from_extension(path).unwrap_or(data.format);

    fs::write(path, write_content(data, format, options))
        .map_err(|e| SubtitleError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn srt_file_to_styled_ass_file() {
        let mut input = NamedTempFile::with_suffix(".srt").unwrap();
        input
            .write_all(b"1\n00:00:01,000 --> 00:00:04,000\n{\\an8}Hello\n")
            .unwrap();

        let data = parse_file(input.path()).unwrap();
        assert_eq!(data.source_path.as_deref(), Some(input.path()));

        let styled = project(&data, &crate::presets::StyleConfig::default()).unwrap();
        let output = NamedTempFile::with_suffix(".ass").unwrap();
        write_file(&styled, output.path(), &WriteOptions::default()).unwrap();

        let reparsed = parse_file(output.path()).unwrap();
        assert_eq!(reparsed.format, SubtitleFormat::Ass);
        assert_eq!(reparsed.cues.len(), 1);
        assert_eq!(reparsed.cues[0].text, "{\\an2}Hello");
        assert_eq!(reparsed.cues[0].start_ms, 1000);
        assert_eq!(reparsed.styles[0].fontsize, 48.0);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = parse_file("/no/such/file.srt").unwrap_err();
        assert!(matches!(err, SubtitleError::ReadError { .. }));
    }
}
