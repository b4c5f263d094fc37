//! Audio step - concatenates hook and main audio.

use crate::audio::{AssemblyError, AudioAssembler};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunStage, RunState, StepOutcome};

pub struct AssembleAudioStep;

impl AssembleAudioStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AssembleAudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AssembleAudioStep {
    fn name(&self) -> &str {
        "AssembleAudio"
    }

    fn stage(&self) -> RunStage {
        RunStage::AssemblingAudio
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let assembler = AudioAssembler::new(ctx.tools(), &ctx.work_dir, &ctx.run_stamp);
        if state.hook.is_some() {
            state.track_intermediate(assembler.merged_path());
        }

        let main = state
            .main
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("Main audio has not been probed"))?;

        if let Some(ref hook) = state.hook {
            ctx.logger.command(
                &assembler
                    .build_command(hook.path(), main.path())
                    .display(ctx.tools.ffmpeg_program()),
            );
        }

        let assembled = assembler
            .assemble(state.hook.as_ref(), main)
            .map_err(|e| {
                if let AssemblyError::Encode(ref tool) = e {
                    ctx.record_tool_failure(tool);
                }
                e
            })?;

        ctx.logger.info(&format!(
            "[AssembleAudio] Total duration {:.3}s ({})",
            assembled.total_duration,
            assembled.path.display()
        ));
        state.audio = Some(assembled);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match state.total_duration() {
            Some(d) if d > 0.0 => Ok(()),
            Some(d) => Err(StepError::invalid_output(format!(
                "Assembled audio has no duration ({:.3}s)",
                d
            ))),
            None => Err(StepError::invalid_output("No assembled audio recorded")),
        }
    }

    fn description(&self) -> &str {
        "Assembled audio"
    }
}
