//! Curate step - preview and the curation gate.

use crate::alignment::{curate_pairs, pairs_to_anchors, reinsert_safe_bounds};
use crate::export::{preview_rows, write_preview};
use crate::models::SpeedMode;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, CurationOutput, SessionState, StepOutcome};

use super::curve::curve_params;

/// Curate step: puts the safe bounds back at both ends, writes the preview
/// and lets the curation gate drop pairs by index.
///
/// Indices shown in the preview are the ones the gate answers with.
pub struct CurateStep;

impl CurateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CurateStep {
    fn name(&self) -> &str {
        "Curate"
    }

    fn description(&self) -> &str {
        "Review correspondences before building the curve"
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

        let params = curve_params(ctx, state)?;
        let (fingerprints, correspondence) = match (&state.fingerprints, &state.correspondence) {
            (Some(f), Some(c)) => (f, c),
            _ => return Err(StepError::precondition_failed("Pairs have not been matched")),
        };

        let pairs = reinsert_safe_bounds(&correspondence.pairs, &params.safe_frames);

        let preview = if ctx.settings.export.write_preview {
            let anchors =
                pairs_to_anchors(&pairs, &fingerprints.source, &fingerprints.target, &params)?;
            let rows = preview_rows(&pairs, &anchors, &fingerprints.source, &fingerprints.target);
            let path = ctx.preview_path();
            write_preview(&path, &rows, params.unit)?;
            ctx.logger
                .info(&format!("Preview written to {}", path.display()));
            Some(path)
        } else {
            None
        };

        let kept = curate_pairs(ctx.curation_gate.as_ref(), &pairs)?;
        let removed = pairs.len() - kept.len();

        if removed > 0 {
            ctx.logger.info(&format!(
                "Curation removed {} of {} pairs",
                removed,
                pairs.len()
            ));
        } else {
            ctx.logger.info(&format!("Keeping all {} pairs", pairs.len()));
        }

        state.curated = Some(CurationOutput {
            pairs: kept,
            removed,
            preview,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        if state.curated.is_none() {
            return Err(StepError::invalid_output("Curated pairs not recorded"));
        }
        Ok(())
    }
}
