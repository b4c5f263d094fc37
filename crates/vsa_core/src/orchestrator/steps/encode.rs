//! Encode step - runs the final composite through ffmpeg.

use crate::compose::EncodeCommandBuilder;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunStage, RunState, StepOutcome};

pub struct EncodeStep;

impl EncodeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EncodeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for EncodeStep {
    fn name(&self) -> &str {
        "Encode"
    }

    fn stage(&self) -> RunStage {
        RunStage::Encoding
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if !ctx.output_dir.is_dir() {
            return Err(StepError::invalid_input(format!(
                "Output directory does not exist: {}",
                ctx.output_dir.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        // the plan is consumed here
        let plan = state
            .plan
            .take()
            .ok_or_else(|| StepError::invalid_input("No composition plan"))?;

        let output_path = ctx.output_path();
        // a failed encode can leave a partial file behind
        state.output_path = Some(output_path.clone());

        let command =
            EncodeCommandBuilder::new(&plan, &ctx.settings.encoder, &output_path, &ctx.work_dir)
                .build();

        ctx.logger.command(&command.display(ctx.tools.ffmpeg_program()));
        if ctx.settings.logging.show_options_pretty {
            ctx.logger.log_ffmpeg_args_pretty(command.get_args());
        }

        match ctx.tools.run_ffmpeg(&command) {
            Ok(output) => {
                ctx.record_tool_output(&output.stderr, false);
                ctx.logger
                    .info(&format!("[Encode] Wrote {}", output_path.display()));
                Ok(StepOutcome::Success)
            }
            Err(e) => {
                ctx.record_tool_failure(&e);
                Err(StepError::Encode(e))
            }
        }
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match state.output_path {
            Some(ref p) if p.is_file() => Ok(()),
            Some(ref p) => Err(StepError::invalid_output(format!(
                "Encoder reported success but {} is missing",
                p.display()
            ))),
            None => Err(StepError::invalid_output("No output path recorded")),
        }
    }

    fn description(&self) -> &str {
        "Encoded video"
    }
}
