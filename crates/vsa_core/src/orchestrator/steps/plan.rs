//! Plan step - builds the composition layer graph.

use crate::compose::{CompositionInputs, CompositionPlan};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunStage, RunState, StepOutcome};

pub struct PlanCompositionStep;

impl PlanCompositionStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanCompositionStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PlanCompositionStep {
    fn name(&self) -> &str {
        "PlanComposition"
    }

    fn stage(&self) -> RunStage {
        RunStage::Planning
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if let Some(ref thumbnail) = ctx.inputs.thumbnail {
            if !thumbnail.is_file() {
                return Err(StepError::file_not_found(thumbnail.display().to_string()));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let (Some(background), Some(audio)) = (state.background_video.as_ref(), state.audio.as_ref())
        else {
            return Err(StepError::invalid_input(
                "Background and audio must be ready before planning",
            ));
        };

        let plan = CompositionPlan::build(&CompositionInputs {
            background,
            subtitle: state.subtitle_path.as_deref(),
            audio: &audio.path,
            thumbnail: ctx.inputs.thumbnail.as_deref(),
            hook_duration: state.hook_duration,
            total_duration: audio.total_duration,
        });

        ctx.logger
            .debug(&format!("[PlanComposition] filter graph: {}", plan.filter_graph()));
        state.plan = Some(plan);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match state.plan {
            Some(ref plan) if !plan.layers.is_empty() => Ok(()),
            _ => Err(StepError::invalid_output("No composition plan recorded")),
        }
    }

    fn description(&self) -> &str {
        "Planned composition"
    }
}
