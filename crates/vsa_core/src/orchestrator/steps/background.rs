//! Background step - picks background clips and concatenates them.

use crate::background::{concatenate, BackgroundError, BackgroundSelector, ConcatOutput, SelectorOptions};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunStage, RunState, StepOutcome};

pub struct SelectBackgroundStep;

impl SelectBackgroundStep {
    pub fn new() -> Self {
        Self
    }

    fn options(ctx: &Context) -> SelectorOptions {
        let settings = &ctx.settings.background;
        SelectorOptions {
            extensions: settings
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            policy: settings.shortfall,
            seed: ctx.background_seed(),
        }
    }
}

impl Default for SelectBackgroundStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SelectBackgroundStep {
    fn name(&self) -> &str {
        "SelectBackground"
    }

    fn stage(&self) -> RunStage {
        RunStage::SelectingBackground
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let folder = &ctx.inputs.background_folder;
        if !folder.is_dir() {
            return Err(StepError::file_not_found(folder.display().to_string()));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let total = state
            .total_duration()
            .ok_or_else(|| StepError::invalid_input("Audio has not been assembled"))?;

        let options = Self::options(ctx);
        ctx.logger.debug(&format!(
            "[SelectBackground] seed {} policy {:?}",
            options.seed, options.policy
        ));

        let selector = BackgroundSelector::new(ctx.tools(), options);
        let plan = selector.select(&ctx.inputs.background_folder, total)?;
        for clip in &plan.clips {
            ctx.logger.info(&format!(
                "[SelectBackground] {} ({:.3}s)",
                clip.path.display(),
                clip.duration
            ));
        }
        ctx.logger.info(&format!(
            "[SelectBackground] {} clips cover {:.3}s of {:.3}s",
            plan.clips.len(),
            plan.covered(),
            plan.required
        ));

        let planned = ConcatOutput::for_run(&ctx.work_dir, &ctx.run_stamp);
        state.track_intermediate(&planned.manifest);
        state.track_intermediate(&planned.video);

        let output = concatenate(ctx.tools(), &plan, &ctx.work_dir, &ctx.run_stamp)
            .map_err(|e| {
                if let BackgroundError::Concat(ref tool) = e {
                    ctx.record_tool_failure(tool);
                }
                e
            })?;

        state.background = Some(plan);
        state.background_video = Some(output.video);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match state.background_video {
            Some(ref p) if p.is_file() => Ok(()),
            _ => Err(StepError::invalid_output("Concatenated background missing")),
        }
    }

    fn description(&self) -> &str {
        "Selected background"
    }
}
