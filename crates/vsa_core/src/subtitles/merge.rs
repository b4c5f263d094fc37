//! Subtitle timeline merge.
//!
//! Each source is loaded, shifted by its offset and appended; the combined
//! cue list is then stable-sorted by start time. The offset is converted to
//! milliseconds by truncation (`10.9999 s` shifts by `10999 ms`).

use std::path::PathBuf;

use super::error::SubtitleLoadError;
use super::markup::srt_to_ass_text;
use super::types::{SubtitleData, SubtitleFormat};

/// A subtitle file and the time it starts at in the assembled audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleSource {
    pub path: PathBuf,
    /// Seconds; values `<= 0` leave the timing untouched.
    pub offset_secs: f64,
}

impl SubtitleSource {
    pub fn new(path: impl Into<PathBuf>, offset_secs: f64) -> Self {
        Self {
            path: path.into(),
            offset_secs,
        }
    }
}

/// Seconds to whole milliseconds, truncating.
pub fn offset_to_ms(offset_secs: f64) -> i64 {
    if offset_secs > 0.0 {
        (offset_secs * 1000.0).trunc() as i64
    } else {
        0
    }
}

/// Load and merge `sources` in order.
///
/// Returns `None` for no sources. A single unshifted source is returned
/// exactly as loaded. Any load failure aborts the merge.
pub fn merge(sources: &[SubtitleSource]) -> Result<Option<SubtitleData>, SubtitleLoadError> {
    let mut loaded = Vec::with_capacity(sources.len());
    for source in sources {
        let data = super::parse_file(&source.path).map_err(|e| SubtitleLoadError {
            path: source.path.clone(),
            source: e,
        })?;
        tracing::debug!(
            "Loaded {} cues from {} (offset {:.3}s)",
            data.cues.len(),
            source.path.display(),
            source.offset_secs
        );
        loaded.push((data, source.offset_secs));
    }
    Ok(merge_loaded(loaded))
}

/// Merge already loaded cue sets.
pub fn merge_loaded(sources: Vec<(SubtitleData, f64)>) -> Option<SubtitleData> {
    let mut sources = sources.into_iter();
    let (first, first_offset) = sources.next()?;

    let rest: Vec<(SubtitleData, f64)> = sources.collect();
    if rest.is_empty() && offset_to_ms(first_offset) == 0 {
        return Some(first);
    }

    // mixed formats are normalized to ASS text so one writer fits all cues
    let mixed = rest.iter().any(|(d, _)| d.format != first.format);

    let mut merged = SubtitleData {
        cues: Vec::new(),
        styles: first.styles.clone(),
        info: first.info.clone(),
        format: if mixed { SubtitleFormat::Ass } else { first.format },
        source_path: None,
    };

    for (mut data, offset) in std::iter::once((first, first_offset)).chain(rest) {
        data.shift_all(offset_to_ms(offset));
        if mixed && data.format == SubtitleFormat::Srt {
            for cue in &mut data.cues {
                cue.text = srt_to_ass_text(&cue.text);
            }
        }
        merged.cues.append(&mut data.cues);
    }

    merged.sort_by_start();
    Some(merged)
}
