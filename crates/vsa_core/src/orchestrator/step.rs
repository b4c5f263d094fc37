//! Pipeline step trait definition.

use super::errors::StepResult;
use super::types::{Context, RunStage, RunState, StepOutcome};

/// One stage of a run.
///
/// The pipeline calls, in order:
///
/// 1. `validate_input` - check preconditions
/// 2. `execute` - do the work and record results in `state`
/// 3. `validate_output` - verify the recorded results (only after `Success`)
///
/// Files a step creates must be registered with
/// [`RunState::track_intermediate`] before the tool that writes them runs.
pub trait PipelineStep: Send + Sync {
    /// Step name (for logging).
    fn name(&self) -> &str;

    /// State this step represents.
    fn stage(&self) -> RunStage;

    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome>;

    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
