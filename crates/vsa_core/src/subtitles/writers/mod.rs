//! Subtitle writers.
//!
//! Each writer is a pure function from SubtitleData to file content.

mod ass;
mod srt;

pub use ass::{format_ass_time, write_ass};
pub use srt::{format_srt_time, write_srt};

use crate::subtitles::types::{SubtitleData, SubtitleFormat, WriteOptions};

/// Write subtitle data to a string in the given format.
pub fn write_content(data: &SubtitleData, format: SubtitleFormat, options: &WriteOptions) -> String {
    match format {
        SubtitleFormat::Ass => write_ass(data, options),
        SubtitleFormat::Srt => write_srt(data),
    }
}
