//! Run orchestration: one short from inputs to encoded output.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator::run
//!     ├── Step: ProbeAudio          (ProbingAudio)
//!     ├── Step: AssembleAudio       (AssemblingAudio)
//!     ├── Step: MergeSubtitles      (MergingSubtitles)
//!     ├── Step: SelectBackground    (SelectingBackground)
//!     ├── Step: PlanComposition     (Planning)
//!     ├── Step: Encode              (Encoding)
//!     └── cleanup                   (CleaningUp, on every exit path)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vsa_core::config::Settings;
//! use vsa_core::media::FfmpegTools;
//! use vsa_core::orchestrator::{Orchestrator, RunInputs};
//!
//! let inputs = RunInputs::new("in/story_audio.mp3", "backgrounds")
//!     .with_hook_audio("in/story_hook.mp3")
//!     .with_main_subtitle("in/story_audio.srt");
//!
//! let report = Orchestrator::new(Settings::default(), Arc::new(FfmpegTools::default()))
//!     .run(inputs)
//!     .unwrap();
//! println!("{}", report.output_path.display());
//! ```

mod cleanup;
mod errors;
mod pipeline;
mod runner;
mod step;
pub mod steps;
mod types;

pub use cleanup::cleanup;
pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use runner::{create_standard_pipeline, new_run_stamp, Orchestrator, RunHandle};
pub use step::PipelineStep;
pub use steps::{
    AssembleAudioStep, EncodeStep, MergeSubtitlesStep, PlanCompositionStep, ProbeAudioStep,
    SelectBackgroundStep,
};
pub use types::{
    CleanupWarning, Context, ProgressCallback, ProgressEvent, RunInputs, RunReport, RunStage,
    RunState, StepOutcome,
};
