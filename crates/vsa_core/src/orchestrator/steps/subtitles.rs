//! Subtitles step - merges hook and main subtitles onto one timeline and
//! applies the run's style.
//!
//! Hook cues keep their timing; main cues are shifted by the probed hook
//! duration. The styled result is staged in the work directory because the
//! burn-in filter resolves it by file name.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunStage, RunState, StepOutcome};
use crate::subtitles::{merge, write_file, StyleProjector, SubtitleSource, WriteOptions};

pub struct MergeSubtitlesStep;

impl MergeSubtitlesStep {
    pub fn new() -> Self {
        Self
    }

    /// Sources in timeline order with their offsets in seconds.
    pub fn sources(ctx: &Context, state: &RunState) -> Vec<SubtitleSource> {
        let mut sources = Vec::new();
        if let Some(ref hook) = ctx.inputs.hook_subtitle {
            sources.push(SubtitleSource::new(hook, 0.0));
        }
        if let Some(ref main) = ctx.inputs.main_subtitle {
            sources.push(SubtitleSource::new(main, state.hook_duration.unwrap_or(0.0)));
        }
        sources
    }

    /// `<work_dir>/subtitles_<stamp>.ass`
    pub fn staged_path(ctx: &Context) -> std::path::PathBuf {
        ctx.work_dir.join(format!("subtitles_{}.ass", ctx.run_stamp))
    }
}

impl Default for MergeSubtitlesStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MergeSubtitlesStep {
    fn name(&self) -> &str {
        "MergeSubtitles"
    }

    fn stage(&self) -> RunStage {
        RunStage::MergingSubtitles
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let inputs = &ctx.inputs;
        for path in inputs.hook_subtitle.iter().chain(inputs.main_subtitle.iter()) {
            if !path.is_file() {
                return Err(StepError::file_not_found(path.display().to_string()));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let sources = Self::sources(ctx, state);
        for source in &sources {
            ctx.logger.info(&format!(
                "[MergeSubtitles] {} (offset {:.3}s)",
                source.path.display(),
                source.offset_secs
            ));
        }

        let Some(merged) = merge(&sources)? else {
            return Ok(StepOutcome::Skipped("no subtitle files".to_string()));
        };

        // style errors surface here even though only burn-in consumes them
        let projector = StyleProjector::new(&ctx.inputs.style)?;
        let styled = projector.project(&merged);

        let path = Self::staged_path(ctx);
        state.track_intermediate(&path);
        write_file(&styled, &path, &WriteOptions::default())?;

        ctx.logger.info(&format!(
            "[MergeSubtitles] {} cues styled with preset '{}' -> {}",
            styled.dialogue_count(),
            ctx.inputs.style.name,
            path.display()
        ));
        state.subtitle_path = Some(path);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match state.subtitle_path {
            Some(ref p) if p.is_file() => Ok(()),
            Some(ref p) => Err(StepError::invalid_output(format!(
                "Styled subtitle file missing: {}",
                p.display()
            ))),
            None => Err(StepError::invalid_output("No styled subtitle recorded")),
        }
    }

    fn description(&self) -> &str {
        "Merged subtitles"
    }
}
