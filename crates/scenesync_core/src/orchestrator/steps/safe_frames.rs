//! SafeFrames step - asks the selector for the matching start/end cuts.

use crate::alignment::validate_safe_frames;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, SessionState, StepOutcome};

pub struct SafeFramesStep;

impl SafeFramesStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SafeFramesStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SafeFramesStep {
    fn name(&self) -> &str {
        "SafeFrames"
    }

    fn description(&self) -> &str {
        "Confirm matching scene cuts near start and end"
    }

    fn validate_input(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        if ctx.safe_frame_selector.is_none() {
            return Err(StepError::precondition_failed(
                "No safe-frame selector configured",
            ));
        }
        if !state.has_fingerprints() {
            return Err(StepError::precondition_failed("No fingerprints"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        let selector = ctx
            .safe_frame_selector
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("No safe-frame selector configured"))?;
        let fingerprints = state
            .fingerprints
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("No fingerprints"))?;

        let safe = selector.select(&fingerprints.source, &fingerprints.target)?;
        validate_safe_frames(&safe, &fingerprints.source, &fingerprints.target)?;

        ctx.logger.info(&format!(
            "Safe start: source scene {} = target scene {}",
            safe.source_start, safe.target_start
        ));
        ctx.logger.info(&format!(
            "Safe end: source scene {} = target scene {}",
            safe.source_end, safe.target_end
        ));

        state.safe_frames = Some(safe);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        if state.safe_frames.is_none() {
            return Err(StepError::invalid_output("Safe frames not recorded"));
        }
        Ok(())
    }
}
