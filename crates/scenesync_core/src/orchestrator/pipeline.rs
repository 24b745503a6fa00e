//! Pipeline runner that executes steps in sequence.

use std::fs;

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, SessionState, StepOutcome};

/// Pipeline that runs a sequence of steps.
///
/// Steps run strictly in order with validation before and after each one.
/// The first failure aborts the run.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Refuses a session whose source and target are the same file and
    /// creates the work directory, then executes each step in order:
    /// 1. Run `validate_input`
    /// 2. Run `execute`
    /// 3. Run `validate_output` (if execute returned Success)
    pub fn run(
        &self,
        ctx: &Context,
        state: &mut SessionState,
    ) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult {
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        };

        if ctx.spec.source_video == ctx.spec.target_video {
            return Err(PipelineError::validation_failed(
                &ctx.session_name,
                "source and target are the same video",
            ));
        }
        fs::create_dir_all(&ctx.work_dir).map_err(|e| {
            PipelineError::setup_failed(
                &ctx.session_name,
                format!("cannot create {}: {}", ctx.work_dir.display(), e),
            )
        })?;

        let total_steps = self.steps.len().max(1);

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name();
            ctx.logger.phase(step_name);

            let percent = ((i as f64 / total_steps as f64) * 100.0) as u32;
            ctx.report_progress(step_name, percent, step.description());

            ctx.logger
                .debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx, state) {
                ctx.logger.error(&format!("Input validation failed: {}", e));
                return Err(PipelineError::step_failed(&ctx.session_name, step_name, e));
            }

            ctx.logger.debug(&format!("Executing '{}'", step_name));
            let outcome = step.execute(ctx, state).map_err(|e| {
                ctx.logger.error(&format!("Execution failed: {}", e));
                PipelineError::step_failed(&ctx.session_name, step_name, e)
            })?;

            match outcome {
                StepOutcome::Success => {
                    if let Err(e) = step.validate_output(ctx, state) {
                        ctx.logger.error(&format!("Output validation failed: {}", e));
                        return Err(PipelineError::step_failed(&ctx.session_name, step_name, e));
                    }

                    ctx.logger.success(&format!("{} completed", step_name));
                    result.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger
                        .info(&format!("{} skipped: {}", step_name, reason));
                    result.steps_skipped.push(step_name.to_string());
                }
            }
        }

        ctx.report_progress("Complete", 100, "Pipeline finished");
        ctx.logger.success("Pipeline completed successfully");
        ctx.logger.flush();

        Ok(result)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    /// Steps that completed successfully.
    pub steps_completed: Vec<String>,
    /// Steps that were skipped.
    pub steps_skipped: Vec<String>,
}

impl PipelineRunResult {
    /// Check if all steps completed (none skipped).
    pub fn all_completed(&self) -> bool {
        self.steps_skipped.is_empty()
    }

    /// Total number of steps that ran.
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::{LogConfig, SessionLogger};
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::orchestrator::types::SessionSpec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    struct CountingStep {
        name: &'static str,
        execute_count: Arc<AtomicUsize>,
        fail: bool,
    }

    impl PipelineStep for CountingStep {
        fn name(&self) -> &str {
            self.name
        }

        fn validate_input(&self, _ctx: &Context, _state: &SessionState) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut SessionState) -> StepResult<StepOutcome> {
            self.execute_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StepError::precondition_failed("boom"));
            }
            Ok(StepOutcome::Success)
        }

        fn validate_output(&self, _ctx: &Context, _state: &SessionState) -> StepResult<()> {
            Ok(())
        }
    }

    fn step(name: &'static str, count: &Arc<AtomicUsize>, fail: bool) -> CountingStep {
        CountingStep {
            name,
            execute_count: Arc::clone(count),
            fail,
        }
    }

    fn context(dir: &std::path::Path) -> Context {
        context_for(dir, SessionSpec::audio("a.mkv", "b.mkv"))
    }

    fn context_for(dir: &std::path::Path, spec: SessionSpec) -> Context {
        let logger = SessionLogger::new("test", dir, LogConfig::default(), None).unwrap();
        Context::new(
            spec,
            Settings::default(),
            "test",
            dir.to_path_buf(),
            dir.to_path_buf(),
            Arc::new(logger),
        )
    }

    #[test]
    fn pipeline_builds_correctly() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("Step1", &count, false))
            .with_step(step("Step2", &count, false));

        assert_eq!(pipeline.step_count(), 2);
        assert_eq!(pipeline.step_names(), vec!["Step1", "Step2"]);
    }

    #[test]
    fn first_failure_stops_the_run() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("Ok", &count, false))
            .with_step(step("Broken", &count, true))
            .with_step(step("Never", &count, false));

        let mut state = SessionState::new("test");
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        match err {
            PipelineError::StepFailed { step_name, .. } => assert_eq!(step_name, "Broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn progress_reaches_callback_and_log() {
        let dir = tempdir().unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let ctx = context(dir.path()).with_progress_callback(Box::new(
            move |step: &str, percent: u32, _: &str| {
                sink.lock().push((step.to_string(), percent));
            },
        ));
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("Step1", &count, false))
            .with_step(step("Step2", &count, false));

        let mut state = SessionState::new("test");
        pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                ("Step1".to_string(), 0),
                ("Step2".to_string(), 50),
                ("Complete".to_string(), 100)
            ]
        );
        let log = std::fs::read_to_string(ctx.logger.log_path()).unwrap();
        assert!(log.contains("Progress: 0%"));
        assert!(log.contains("Progress: 100%"));
    }

    #[test]
    fn same_video_on_both_sides_is_rejected() {
        let dir = tempdir().unwrap();
        let ctx = context_for(dir.path(), SessionSpec::audio("a.mkv", "a.mkv"));
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new().with_step(step("Never", &count, false));

        let mut state = SessionState::new("test");
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        assert!(matches!(err, PipelineError::ValidationFailed { .. }));
        assert!(err.step_error().is_none());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
