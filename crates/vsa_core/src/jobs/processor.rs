//! Sequential batch driver.
//!
//! Every item gets a fresh [`Orchestrator`] so no state leaks between
//! runs. A failed item is recorded and, unless told otherwise, the batch
//! moves on to the next one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::media::MediaTools;
use crate::orchestrator::Orchestrator;
use crate::presets::{PresetStore, StyleConfig};

use super::discovery::discover;
use super::types::{BatchError, BatchItem, BatchItemResult, BatchSummary};

/// Called before each item with `(index, total, item)`.
pub type BatchProgressCallback<'a> = &'a mut dyn FnMut(usize, usize, &BatchItem);

pub struct BatchProcessor {
    settings: Settings,
    tools: Arc<dyn MediaTools>,
    stop_on_error: bool,
}

impl BatchProcessor {
    pub fn new(settings: Settings, tools: Arc<dyn MediaTools>) -> Self {
        Self {
            settings,
            tools,
            stop_on_error: false,
        }
    }

    /// Stop at the first failed item instead of continuing.
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    /// Check the configured folders and resolve the configured preset.
    pub fn prepare(&self) -> Result<(Vec<BatchItem>, PathBuf, StyleConfig), BatchError> {
        let batch = &self.settings.batch;
        let input = required_folder(&batch.input_folder, "input_folder")?;
        let video = required_folder(&batch.video_folder, "video_folder")?;

        let store = PresetStore::load(&self.settings.paths.presets_file);
        let style = store
            .get(&batch.preset)
            .cloned()
            .ok_or_else(|| BatchError::UnknownPreset(batch.preset.clone()))?;

        let items = discover(&input, &batch.suffixes)?;
        if items.is_empty() {
            return Err(BatchError::NoItems {
                folder: input,
                suffix: batch.suffixes.audio.clone(),
            });
        }

        Ok((items, video, style))
    }

    /// Discover items in the configured input folder and process them.
    pub fn run_configured(
        &self,
        progress: BatchProgressCallback<'_>,
    ) -> Result<BatchSummary, BatchError> {
        let (items, video, style) = self.prepare()?;
        Ok(self.process(&items, &video, &style, progress))
    }

    /// Process `items` one after another.
    pub fn process(
        &self,
        items: &[BatchItem],
        background_folder: &Path,
        style: &StyleConfig,
        progress: BatchProgressCallback<'_>,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let total = items.len();

        for (i, item) in items.iter().enumerate() {
            progress(i, total, item);
            tracing::info!("Processing {} ({}/{})", item.base_name, i + 1, total);

            let inputs = item.to_run_inputs(background_folder, style);
            let outcome = Orchestrator::new(self.settings.clone(), Arc::clone(&self.tools)).run(inputs);

            match outcome {
                Ok(report) => {
                    tracing::info!("Finished {}: {}", item.base_name, report.output_path.display());
                    summary
                        .results
                        .push(BatchItemResult::success(&item.base_name, report.output_path));
                }
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", item.base_name, e);
                    summary.results.push(BatchItemResult::failure(&item.base_name, &e));
                    if self.stop_on_error {
                        summary.stopped_early = i + 1 < total;
                        break;
                    }
                }
            }
        }

        summary
    }
}

fn required_folder(value: &str, name: &'static str) -> Result<PathBuf, BatchError> {
    if value.trim().is_empty() {
        return Err(BatchError::FolderNotSet(name));
    }
    let path = PathBuf::from(value);
    if !path.is_dir() {
        return Err(BatchError::MissingFolder(path));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeTools;
    use std::fs;
    use tempfile::tempdir;

    /// Items `a`, `b` and `bad`; the audio of `bad` cannot be probed.
    fn setup(root: &Path) -> (Settings, FakeTools) {
        for sub in ["in", "bg"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        for name in ["a_audio.mp3", "b_audio.wav", "bad_audio.mp3"] {
            fs::write(root.join("in").join(name), b"audio").unwrap();
        }
        fs::write(root.join("bg/clip.mp4"), b"video").unwrap();

        let mut settings = Settings::default();
        settings.paths.output_folder = root.join("out").to_string_lossy().into_owned();
        settings.paths.work_root = root.join("work").to_string_lossy().into_owned();
        settings.paths.logs_folder = root.join("logs").to_string_lossy().into_owned();
        settings.paths.presets_file = root.join("presets.json").to_string_lossy().into_owned();
        settings.batch.input_folder = root.join("in").to_string_lossy().into_owned();
        settings.batch.video_folder = root.join("bg").to_string_lossy().into_owned();

        let tools = FakeTools::new()
            .with_duration(root.join("in/a_audio.mp3"), 4.0)
            .with_duration(root.join("in/b_audio.wav"), 6.0)
            .with_duration(root.join("bg/clip.mp4"), 30.0);
        (settings, tools)
    }

    #[test]
    fn failed_item_does_not_stop_the_batch() {
        let dir = tempdir().unwrap();
        let (settings, tools) = setup(dir.path());
        let processor = BatchProcessor::new(settings, Arc::new(tools));

        let mut seen = Vec::new();
        let summary = processor
            .run_configured(&mut |i, total, item| seen.push((i, total, item.base_name.clone())))
            .unwrap();

        assert_eq!(
            seen,
            vec![
                (0, 3, "a".to_string()),
                (1, 3, "b".to_string()),
                (2, 3, "bad".to_string())
            ]
        );
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.stopped_early);
        assert!(summary.results[0].output_path.as_ref().unwrap().is_file());
        assert_eq!(
            summary.results[2].failed_stage,
            Some(crate::orchestrator::RunStage::ProbingAudio)
        );
    }

    #[test]
    fn stop_on_error_ends_early() {
        let dir = tempdir().unwrap();
        let (settings, _) = setup(dir.path());
        // nothing is probeable
        let processor = BatchProcessor::new(settings, Arc::new(FakeTools::new())).stop_on_error(true);

        let summary = processor.run_configured(&mut |_, _, _| {}).unwrap();
        assert_eq!(summary.results.len(), 1);
        assert!(summary.stopped_early);
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let dir = tempdir().unwrap();
        let (mut settings, tools) = setup(dir.path());
        settings.batch.preset = "Nope".to_string();

        let err = BatchProcessor::new(settings, Arc::new(tools))
            .prepare()
            .unwrap_err();
        assert!(matches!(err, BatchError::UnknownPreset(_)));
    }

    #[test]
    fn unset_folder_is_rejected() {
        let dir = tempdir().unwrap();
        let (mut settings, tools) = setup(dir.path());
        settings.batch.video_folder.clear();

        let err = BatchProcessor::new(settings, Arc::new(tools))
            .prepare()
            .unwrap_err();
        assert!(matches!(err, BatchError::FolderNotSet("video_folder")));
    }
}
