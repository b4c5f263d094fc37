//! Batch item and result types.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::orchestrator::{PipelineError, RunInputs, RunStage};
use crate::presets::StyleConfig;

/// One discovered set of input files.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// Lower-cased file-name prefix shared by the set.
    pub base_name: String,
    pub main_audio: PathBuf,
    pub hook_audio: Option<PathBuf>,
    pub main_subtitle: Option<PathBuf>,
    pub hook_subtitle: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
}

impl BatchItem {
    pub fn to_run_inputs(&self, background_folder: &Path, style: &StyleConfig) -> RunInputs {
        RunInputs {
            hook_audio: self.hook_audio.clone(),
            main_audio: self.main_audio.clone(),
            hook_subtitle: self.hook_subtitle.clone(),
            main_subtitle: self.main_subtitle.clone(),
            thumbnail: self.thumbnail.clone(),
            background_folder: background_folder.to_path_buf(),
            style: style.clone(),
        }
    }
}

/// Outcome of one batch item.
#[derive(Debug, Clone)]
pub struct BatchItemResult {
    pub base_name: String,
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
    /// Stage that failed, if the failure happened inside the pipeline.
    pub failed_stage: Option<RunStage>,
}

impl BatchItemResult {
    pub fn success(base_name: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            base_name: base_name.into(),
            success: true,
            output_path: Some(output_path),
            error: None,
            failed_stage: None,
        }
    }

    pub fn failure(base_name: impl Into<String>, error: &PipelineError) -> Self {
        Self {
            base_name: base_name.into(),
            success: false,
            output_path: None,
            error: Some(error.to_string()),
            failed_stage: error.stage(),
        }
    }
}

/// Results of a whole batch, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub results: Vec<BatchItemResult>,
    /// Set when the batch stopped early after a failure.
    pub stopped_early: bool,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Folder not set: {0}")]
    FolderNotSet(&'static str),

    #[error("Folder does not exist: {}", .0.display())]
    MissingFolder(PathBuf),

    #[error("Cannot read input folder '{}': {source}", .path.display())]
    ReadFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No audio files with suffix '{suffix}' in '{}'", .folder.display())]
    NoItems { folder: PathBuf, suffix: String },

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts() {
        let err = PipelineError::setup_failed("x", "boom");
        let summary = BatchSummary {
            results: vec![
                BatchItemResult::success("a", PathBuf::from("/out/a.mp4")),
                BatchItemResult::failure("b", &err),
            ],
            stopped_early: false,
        };
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(summary.results[1].error.as_deref().unwrap().contains("boom"));
        assert_eq!(summary.results[1].failed_stage, None);
    }
}
