//! Media asset with a lazily probed, cached duration.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::error::ProbeError;
use super::tools::MediaTools;

/// A media file plus its duration, probed at most once.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    path: PathBuf,
    duration: OnceLock<f64>,
}

impl MediaAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            duration: OnceLock::new(),
        }
    }

    /// Asset with an already known duration.
    pub fn with_duration(path: impl Into<PathBuf>, duration: f64) -> Self {
        let asset = Self::new(path);
        let _ = asset.duration.set(duration);
        asset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Duration in seconds, probing on first use.
    pub fn duration(&self, tools: &dyn MediaTools) -> Result<f64, ProbeError> {
        if let Some(d) = self.duration.get() {
            return Ok(*d);
        }
        let probed = tools.probe_duration(&self.path)?;
        Ok(*self.duration.get_or_init(|| probed))
    }

    /// Cached duration, if already probed.
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.get().copied()
    }

    /// Lower-cased file extension.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeTools;

    #[test]
    fn probes_once_and_caches() {
        let tools = FakeTools::new().with_duration("/a/main.mp3", 61.25);
        let asset = MediaAsset::new("/a/main.mp3");

        assert_eq!(asset.known_duration(), None);
        assert_eq!(asset.duration(&tools).unwrap(), 61.25);
        assert_eq!(asset.duration(&tools).unwrap(), 61.25);
        assert_eq!(tools.probe_count(), 1);
    }

    #[test]
    fn known_duration_skips_probe() {
        let tools = FakeTools::new();
        let asset = MediaAsset::with_duration("/a/x.mp3", 2.0);
        assert_eq!(asset.duration(&tools).unwrap(), 2.0);
        assert_eq!(tools.probe_count(), 0);
    }

    #[test]
    fn extension_is_lowercase() {
        assert_eq!(MediaAsset::new("clip.MP3").extension().as_deref(), Some("mp3"));
        assert_eq!(MediaAsset::new("noext").extension(), None);
    }
}
