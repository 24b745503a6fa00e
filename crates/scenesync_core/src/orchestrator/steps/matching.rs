//! Match step - nearest-twin matching and consistency filtering.

use crate::alignment::correspond;
use crate::models::SpeedMode;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, SessionState, StepOutcome};

/// Match step: pairs every scene cut between the safe frames with its
/// nearest twin and keeps the monotonic subsequence.
///
/// Skipped in fixed-speed mode.
pub struct MatchStep;

impl MatchStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MatchStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MatchStep {
    fn name(&self) -> &str {
        "Match"
    }

    fn description(&self) -> &str {
        "Match scene cuts and filter inconsistent pairs"
    }

    fn validate_input(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        if !state.has_fingerprints() || state.safe_frames.is_none() {
            return Err(StepError::precondition_failed(
                "Fingerprints and safe frames are required",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        if ctx.settings.alignment.speed_mode == SpeedMode::Fixed {
            return Ok(StepOutcome::Skipped("fixed speed mode".to_string()));
        }

        let (fingerprints, safe) = match (&state.fingerprints, &state.safe_frames) {
            (Some(f), Some(s)) => (f, s),
            _ => {
                return Err(StepError::precondition_failed(
                    "Fingerprints and safe frames are required",
                ))
            }
        };

        let result = correspond(&fingerprints.source, &fingerprints.target, safe)?;

        ctx.logger.info(&format!(
            "{} candidate pairs ({} matched as main)",
            result.candidates,
            if result.reversed_roles { "target" } else { "source" }
        ));
        if result.stats.total_removed() > 0 {
            ctx.logger.info(&format!(
                "Removed {} unmatched, {} duplicate, {} out-of-order",
                result.stats.unmatched, result.stats.duplicates, result.stats.out_of_order
            ));
        }
        ctx.logger
            .info(&format!("{} consistent pairs", result.pairs.len()));

        state.correspondence = Some(result);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        if state.correspondence.is_none() {
            return Err(StepError::invalid_output("Correspondence not recorded"));
        }
        Ok(())
    }
}
