//! Probe step - measures the hook and main audio.

use crate::media::MediaAsset;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunStage, RunState, StepOutcome};

pub struct ProbeAudioStep;

impl ProbeAudioStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProbeAudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ProbeAudioStep {
    fn name(&self) -> &str {
        "ProbeAudio"
    }

    fn stage(&self) -> RunStage {
        RunStage::ProbingAudio
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let inputs = &ctx.inputs;
        for path in std::iter::once(&inputs.main_audio).chain(inputs.hook_audio.iter()) {
            if !path.is_file() {
                return Err(StepError::file_not_found(path.display().to_string()));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let main = MediaAsset::new(&ctx.inputs.main_audio);
        let main_duration = main.duration(ctx.tools())?;
        ctx.logger.info(&format!(
            "[ProbeAudio] Main audio: {} ({:.3}s)",
            main.path().display(),
            main_duration
        ));
        state.main = Some(main);

        if let Some(ref hook_path) = ctx.inputs.hook_audio {
            let hook = MediaAsset::new(hook_path);
            let hook_duration = hook.duration(ctx.tools())?;
            ctx.logger.info(&format!(
                "[ProbeAudio] Hook audio: {} ({:.3}s)",
                hook.path().display(),
                hook_duration
            ));
            state.hook_duration = Some(hook_duration);
            state.hook = Some(hook);
        }

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.main.is_none() {
            return Err(StepError::invalid_output("Main audio was not probed"));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Probed audio durations"
    }
}
