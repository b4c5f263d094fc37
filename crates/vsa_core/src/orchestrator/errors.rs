//! Error types for the run pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Stage → Component → Detail

use std::io;

use thiserror::Error;

use crate::audio::AssemblyError;
use crate::background::BackgroundError;
use crate::media::{ProbeError, ToolError};
use crate::subtitles::{InvalidStyleError, SubtitleError, SubtitleLoadError};

use super::types::RunStage;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage failed; the remaining stages were skipped.
    #[error("Run '{run_name}' failed at stage {stage}: {source}")]
    StepFailed {
        run_name: String,
        stage: RunStage,
        #[source]
        source: StepError,
    },

    /// Failed to set up the run (directories, log file).
    #[error("Run '{run_name}' setup failed: {message}")]
    SetupFailed { run_name: String, message: String },

    /// The worker thread of a spawned run panicked.
    #[error("Run '{run_name}' worker panicked")]
    WorkerPanicked { run_name: String },
}

impl PipelineError {
    pub fn step_failed(run_name: impl Into<String>, stage: RunStage, source: StepError) -> Self {
        Self::StepFailed {
            run_name: run_name.into(),
            stage,
            source,
        }
    }

    pub fn setup_failed(run_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            run_name: run_name.into(),
            message: message.into(),
        }
    }

    /// Stage that failed, if the failure happened inside the pipeline.
    pub fn stage(&self) -> Option<RunStage> {
        match self {
            Self::StepFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Error from a single stage.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    SubtitleLoad(#[from] SubtitleLoadError),

    #[error("Failed to write subtitles: {0}")]
    SubtitleWrite(#[from] SubtitleError),

    #[error(transparent)]
    InvalidStyle(#[from] InvalidStyleError),

    #[error(transparent)]
    Background(#[from] BackgroundError),

    /// Final composite encode failed.
    #[error("Encode failed: {0}")]
    Encode(ToolError),

    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Tool diagnostics carried by this error, if an external tool failed.
    pub fn tool_error(&self) -> Option<&ToolError> {
        match self {
            Self::Encode(e) => Some(e),
            Self::Assembly(AssemblyError::Encode(e)) => Some(e),
            Self::Background(BackgroundError::Concat(e)) => Some(e),
            _ => None,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_error_shows_last_diagnostic_line() {
        let err = StepError::Encode(ToolError::failed("ffmpeg", 1, "frame=1\nConversion failed!\n"));
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("Conversion failed!"));
        assert!(err.tool_error().is_some());
    }

    #[test]
    fn pipeline_error_names_run_and_stage() {
        let step_err = StepError::file_not_found("/in/story_audio.mp3");
        let err = PipelineError::step_failed("story_audio_1", RunStage::ProbingAudio, step_err);

        let msg = err.to_string();
        assert!(msg.contains("story_audio_1"));
        assert!(msg.contains("ProbingAudio"));
        assert!(msg.contains("/in/story_audio.mp3"));
        assert_eq!(err.stage(), Some(RunStage::ProbingAudio));
    }

    #[test]
    fn component_errors_convert() {
        let err: StepError = BackgroundError::NoBackground {
            folder: "/bg".into(),
        }
        .into();
        assert!(matches!(err, StepError::Background(_)));
        assert!(err.tool_error().is_none());
    }
}
