//! Single-run orchestrator.
//!
//! An [`Orchestrator`] drives one short from `Idle` to `Done` or `Failed`.
//! It is consumed by the run, so every run gets a fresh instance and a
//! fresh run stamp.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::config::Settings;
use crate::logging::{LogCallback, LogConfig, RunLogger};
use crate::media::MediaTools;

use super::cleanup::cleanup;
use super::errors::{PipelineError, PipelineResult};
use super::pipeline::Pipeline;
use super::steps::{
    AssembleAudioStep, EncodeStep, MergeSubtitlesStep, PlanCompositionStep, ProbeAudioStep,
    SelectBackgroundStep,
};
use super::types::{
    resolve_path, Context, ProgressCallback, ProgressEvent, RunInputs, RunReport, RunStage,
    RunState,
};

/// Create the standard pipeline with all stages in order.
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ProbeAudioStep::new())
        .with_step(AssembleAudioStep::new())
        .with_step(MergeSubtitlesStep::new())
        .with_step(SelectBackgroundStep::new())
        .with_step(PlanCompositionStep::new())
        .with_step(EncodeStep::new())
}

/// Millisecond local timestamp, e.g. `20260301_142233_517`.
pub fn new_run_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S_%3f").to_string()
}

pub struct Orchestrator {
    settings: Settings,
    tools: Arc<dyn MediaTools>,
    run_stamp: String,
    log_callback: Option<LogCallback>,
    progress_callback: Option<ProgressCallback>,
    /// Anchor for relative paths; the process working directory when unset.
    base_dir: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(settings: Settings, tools: Arc<dyn MediaTools>) -> Self {
        Self {
            settings,
            tools,
            run_stamp: new_run_stamp(),
            log_callback: None,
            progress_callback: None,
            base_dir: None,
        }
    }

    /// Override the generated run stamp.
    pub fn with_run_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.run_stamp = stamp.into();
        self
    }

    /// Receive every formatted run log line.
    pub fn with_log_callback(mut self, callback: LogCallback) -> Self {
        self.log_callback = Some(callback);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Resolve relative settings and input paths against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn run_stamp(&self) -> &str {
        &self.run_stamp
    }

    /// Run every stage, then clean up regardless of the outcome.
    pub fn run(self, inputs: RunInputs) -> PipelineResult<RunReport> {
        let run_name = format!("{}_{}", inputs.stem(), self.run_stamp);

        let base_dir = match self.base_dir {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(|e| {
                PipelineError::setup_failed(
                    &run_name,
                    format!("cannot read working directory: {}", e),
                )
            })?,
        };
        let inputs = inputs.resolved_against(&base_dir);

        let work_dir = resolve_path(&base_dir, &self.settings.paths.work_root).join(&run_name);
        let output_dir = resolve_path(&base_dir, &self.settings.paths.output_folder);
        let logs_dir = resolve_path(&base_dir, &self.settings.paths.logs_folder);
        for dir in [&work_dir, &output_dir] {
            fs::create_dir_all(dir).map_err(|e| {
                PipelineError::setup_failed(
                    &run_name,
                    format!("cannot create {}: {}", dir.display(), e),
                )
            })?;
        }

        let log_config = LogConfig {
            compact: self.settings.logging.compact,
            error_tail: self.settings.logging.error_tail as usize,
            ..LogConfig::default()
        };
        let logger = match RunLogger::new(&run_name, &logs_dir, log_config, self.log_callback) {
            Ok(logger) => logger,
            Err(e) => {
                let _ = fs::remove_dir(&work_dir);
                return Err(PipelineError::setup_failed(
                    &run_name,
                    format!("cannot open log: {}", e),
                ));
            }
        };
        let logger = Arc::new(logger);

        let keep_logs = self.settings.logging.keep_run_logs;
        let copy_subtitles = self.settings.batch.copy_subtitles_to_output;

        let mut ctx = Context::new(
            inputs,
            self.settings,
            &run_name,
            self.run_stamp,
            work_dir,
            output_dir,
            Arc::clone(&logger),
            self.tools,
        );
        if let Some(callback) = self.progress_callback {
            ctx = ctx.with_progress_callback(callback);
        }

        logger.section(&format!("Run {}", run_name));
        logger.info(&format!("Main audio: {}", ctx.inputs.main_audio.display()));
        logger.info(&format!(
            "Background folder: {}",
            ctx.inputs.background_folder.display()
        ));

        let mut state = RunState::new();
        let outcome = create_standard_pipeline().run(&ctx, &mut state);

        // copy before cleanup removes the staged file
        let subtitle_copy = match (&outcome, copy_subtitles) {
            (Ok(_), true) => copy_subtitle_out(&ctx, &state),
            _ => None,
        };

        state.stage = RunStage::CleaningUp;
        logger.phase(RunStage::CleaningUp.as_str());
        let warnings = cleanup(&ctx, &state, outcome.is_ok());

        match outcome {
            Ok(result) => {
                state.stage = RunStage::Done;
                ctx.report_progress(RunStage::Done, "Done");

                let output_path = state.output_path.clone().unwrap_or_else(|| ctx.output_path());
                logger.success(&format!("Output: {}", output_path.display()));

                let log_path = logger.log_path().to_path_buf();
                if !keep_logs {
                    logger.close();
                    let _ = fs::remove_file(&log_path);
                }

                Ok(RunReport {
                    run_name,
                    output_path,
                    total_duration: state.total_duration().unwrap_or(0.0),
                    subtitle_copy,
                    log_path,
                    stages_completed: result.stages_completed,
                    stages_skipped: result.stages_skipped,
                    warnings,
                })
            }
            Err(e) => {
                state.stage = RunStage::Failed;
                logger.error(&e.to_string());
                logger.flush();
                Err(e)
            }
        }
    }

    /// Run on a worker thread; progress arrives on the handle's channel.
    pub fn spawn(mut self, inputs: RunInputs) -> RunHandle {
        let (sender, receiver) = mpsc::channel();
        let sender = Mutex::new(sender);
        let forward = self.progress_callback.take();

        self.progress_callback = Some(Box::new(move |event: &ProgressEvent| {
            if let Some(ref callback) = forward {
                callback(event);
            }
            let _ = sender.lock().send(event.clone());
        }));

        let run_name = format!("{}_{}", inputs.stem(), self.run_stamp);
        let join = thread::spawn(move || self.run(inputs));

        RunHandle {
            run_name,
            join,
            progress: receiver,
        }
    }
}

/// Copy the styled subtitle next to the output as `<output stem>.ass`.
fn copy_subtitle_out(ctx: &Context, state: &RunState) -> Option<PathBuf> {
    let source = state.subtitle_path.as_ref()?;
    let output = state.output_path.as_ref()?;
    let target = output.with_extension("ass");

    match fs::copy(source, &target) {
        Ok(_) => {
            ctx.logger
                .info(&format!("Copied subtitles to {}", target.display()));
            Some(target)
        }
        Err(e) => {
            ctx.logger.warn(&format!(
                "Could not copy subtitles to {}: {}",
                target.display(),
                e
            ));
            None
        }
    }
}

/// A run executing on its own thread.
pub struct RunHandle {
    run_name: String,
    join: JoinHandle<PipelineResult<RunReport>>,
    progress: Receiver<ProgressEvent>,
}

impl RunHandle {
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Progress events; the channel closes when the run ends.
    pub fn progress(&self) -> &Receiver<ProgressEvent> {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run to end.
    pub fn join(self) -> PipelineResult<RunReport> {
        self.join
            .join()
            .unwrap_or_else(|_| Err(PipelineError::WorkerPanicked {
                run_name: self.run_name,
            }))
    }
}
