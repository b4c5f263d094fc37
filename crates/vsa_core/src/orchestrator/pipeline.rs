//! Pipeline runner that executes steps in sequence.

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, RunStage, RunState, StepOutcome};

/// Ordered sequence of stages.
///
/// Stages run strictly one after another; the first failure stops the
/// pipeline. Cleanup is not a step: the caller runs it on every exit path.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run every step against `ctx`, recording results in `state`.
    ///
    /// Progress is reported after each stage completes (or is skipped).
    pub fn run(&self, ctx: &Context, state: &mut RunState) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult::default();

        for step in &self.steps {
            let stage = step.stage();
            let step_name = step.name();
            state.stage = stage;
            ctx.logger.phase(step_name);

            ctx.logger.debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx) {
                ctx.logger.error(&format!("Input validation failed: {}", e));
                return Err(PipelineError::step_failed(&ctx.run_name, stage, e));
            }

            let outcome = step.execute(ctx, state).map_err(|e| {
                ctx.logger.error(&format!("{} failed: {}", step_name, e));
                PipelineError::step_failed(&ctx.run_name, stage, e)
            })?;

            match outcome {
                StepOutcome::Success => {
                    if let Err(e) = step.validate_output(ctx, state) {
                        ctx.logger.error(&format!("Output validation failed: {}", e));
                        return Err(PipelineError::step_failed(&ctx.run_name, stage, e));
                    }

                    ctx.logger.success(&format!("{} completed", step_name));
                    result.stages_completed.push(stage);
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger.info(&format!("{} skipped: {}", step_name, reason));
                    result.stages_skipped.push(stage);
                }
            }

            ctx.report_progress(stage, step.description());
        }

        Ok(result)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Stages in execution order.
    pub fn stages(&self) -> Vec<RunStage> {
        self.steps.iter().map(|s| s.stage()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Stages a pipeline run went through.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunResult {
    pub stages_completed: Vec<RunStage>,
    pub stages_skipped: Vec<RunStage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogConfig, RunLogger};
    use crate::media::testing::FakeTools;
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::orchestrator::types::{ProgressEvent, RunInputs};
    use crate::config::Settings;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    struct CountingStep {
        stage: RunStage,
        fail: bool,
        count: Arc<AtomicUsize>,
    }

    impl PipelineStep for CountingStep {
        fn name(&self) -> &str {
            self.stage.as_str()
        }

        fn stage(&self) -> RunStage {
            self.stage
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut RunState) -> StepResult<StepOutcome> {
            self.count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StepError::invalid_input("scripted"))
            } else {
                Ok(StepOutcome::Success)
            }
        }

        fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
            Ok(())
        }
    }

    fn context(dir: &std::path::Path, events: Arc<Mutex<Vec<ProgressEvent>>>) -> Context {
        let logger = RunLogger::new("t", dir, LogConfig::default(), None).unwrap();
        Context::new(
            RunInputs::new(dir.join("a.mp3"), dir),
            Settings::default(),
            "t",
            "1",
            dir.to_path_buf(),
            dir.to_path_buf(),
            Arc::new(logger),
            Arc::new(FakeTools::new()),
        )
        .with_progress_callback(Box::new(move |e| events.lock().push(e.clone())))
    }

    fn step(stage: RunStage, fail: bool, count: &Arc<AtomicUsize>) -> CountingStep {
        CountingStep {
            stage,
            fail,
            count: Arc::clone(count),
        }
    }

    #[test]
    fn runs_in_order_and_reports_checkpoints() {
        let dir = tempdir().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let ctx = context(dir.path(), Arc::clone(&events));
        let count = Arc::new(AtomicUsize::new(0));

        let pipeline = Pipeline::new()
            .with_step(step(RunStage::ProbingAudio, false, &count))
            .with_step(step(RunStage::AssemblingAudio, false, &count));
        assert_eq!(
            pipeline.stages(),
            vec![RunStage::ProbingAudio, RunStage::AssemblingAudio]
        );

        let mut state = RunState::new();
        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(result.stages_completed.len(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        let percents: Vec<u32> = events.lock().iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![5, 15]);
    }

    #[test]
    fn failure_skips_remaining_steps() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path(), Arc::new(Mutex::new(Vec::new())));
        let count = Arc::new(AtomicUsize::new(0));

        let pipeline = Pipeline::new()
            .with_step(step(RunStage::ProbingAudio, true, &count))
            .with_step(step(RunStage::AssemblingAudio, false, &count));

        let mut state = RunState::new();
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        assert_eq!(err.stage(), Some(RunStage::ProbingAudio));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(state.stage, RunStage::ProbingAudio);
    }
}
