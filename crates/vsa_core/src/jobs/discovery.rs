//! Batch discovery from an input folder.
//!
//! Files are paired by lower-cased name prefix: `kb2_audio.wav` gives the
//! base name `kb2`, which then collects `kb2_hook.mp3`, `kb2_audio.srt`,
//! `kb2_hook.srt` and `kb2_Hook.png`. Which suffix means what comes from
//! [`SuffixSettings`].

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SuffixSettings;

use super::types::{BatchError, BatchItem};

const AUDIO_EXTENSIONS: &[&str] = &[".wav", ".mp3"];
const SUBTITLE_EXTENSIONS: &[&str] = &[".srt"];
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

/// Files found for one base name. `None` means not present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchedFiles {
    pub audio: Option<PathBuf>,
    pub hook: Option<PathBuf>,
    pub subtitle: Option<PathBuf>,
    pub hook_subtitle: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
}

/// Directory entries as `(lower-cased name, path)`, sorted by name.
fn list_files(folder: &Path) -> Result<Vec<(String, PathBuf)>, BatchError> {
    let entries = fs::read_dir(folder).map_err(|e| BatchError::ReadFolder {
        path: folder.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter_map(|p| {
            let name = p.file_name()?.to_string_lossy().to_lowercase();
            Some((name, p))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext))
}

/// Base names of audio files carrying the audio suffix, sorted.
pub fn base_names(folder: &Path, suffixes: &SuffixSettings) -> Result<Vec<String>, BatchError> {
    let audio_suffix = suffixes.audio.to_lowercase();
    if audio_suffix.is_empty() {
        return Ok(Vec::new());
    }

    let names: BTreeSet<String> = list_files(folder)?
        .into_iter()
        .filter(|(name, _)| has_extension(name, AUDIO_EXTENSIONS))
        .filter_map(|(name, _)| {
            name.find(&audio_suffix)
                .map(|pos| name[..pos].to_string())
        })
        .collect();

    Ok(names.into_iter().collect())
}

/// Find the files belonging to `base_name`, case-insensitively.
///
/// When several files match one role the first in name order wins.
pub fn find_matching_files(
    folder: &Path,
    base_name: &str,
    suffixes: &SuffixSettings,
) -> Result<MatchedFiles, BatchError> {
    let base = base_name.to_lowercase();
    let prefix = |suffix: &str| -> Option<String> {
        (!suffix.is_empty()).then(|| format!("{}{}", base, suffix.to_lowercase()))
    };
    let audio = prefix(&suffixes.audio);
    let subtitle = prefix(&suffixes.subtitle);
    let hook = prefix(&suffixes.hook);
    let hook_subtitle = prefix(&suffixes.hook_subtitle);
    let thumbnail = prefix(&suffixes.thumbnail);

    let starts = |name: &str, p: &Option<String>| p.as_deref().is_some_and(|p| name.starts_with(p));

    let mut found = MatchedFiles::default();
    for (name, path) in list_files(folder)? {
        let slot = if has_extension(&name, AUDIO_EXTENSIONS) {
            if starts(&name, &audio) {
                &mut found.audio
            } else if starts(&name, &hook) {
                &mut found.hook
            } else {
                continue;
            }
        } else if has_extension(&name, SUBTITLE_EXTENSIONS) {
            if starts(&name, &subtitle) {
                &mut found.subtitle
            } else if starts(&name, &hook_subtitle) {
                &mut found.hook_subtitle
            } else {
                continue;
            }
        } else if has_extension(&name, IMAGE_EXTENSIONS) && starts(&name, &thumbnail) {
            &mut found.thumbnail
        } else {
            continue;
        };

        if slot.is_none() {
            *slot = Some(path);
        }
    }

    Ok(found)
}

/// Every complete item in `folder`. Base names without main audio are
/// skipped with a warning.
pub fn discover(folder: &Path, suffixes: &SuffixSettings) -> Result<Vec<BatchItem>, BatchError> {
    let mut items = Vec::new();

    for base_name in base_names(folder, suffixes)? {
        let files = find_matching_files(folder, &base_name, suffixes)?;
        let Some(main_audio) = files.audio else {
            tracing::warn!("Skipping {}: no audio file found", base_name);
            continue;
        };

        items.push(BatchItem {
            base_name,
            main_audio,
            hook_audio: files.hook,
            main_subtitle: files.subtitle,
            hook_subtitle: files.hook_subtitle,
            thumbnail: files.thumbnail,
        });
    }

    tracing::debug!("Discovered {} batch items in {}", items.len(), folder.display());
    Ok(items)
}
