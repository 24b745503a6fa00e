//! Fingerprint step - extracts and hashes the scene cuts of both videos.

use crate::fingerprint::FingerprintOptions;
use crate::models::{FingerprintSet, MediaInfo};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{
    Context, FingerprintCounts, FingerprintOutput, SessionState, StepOutcome,
};

/// Fingerprint step: one `FingerprintSet` per video, stills in
/// `<work>/{source,target}`.
pub struct FingerprintStep;

impl FingerprintStep {
    pub fn new() -> Self {
        Self
    }

    fn fingerprint_side(
        &self,
        ctx: &Context,
        side: &str,
        video: &std::path::Path,
        info: &MediaInfo,
        options: &FingerprintOptions,
    ) -> StepResult<FingerprintSet> {
        ctx.logger.section(&format!("{} scene cuts", side));
        let frames_dir = ctx.frames_dir(side);

        let set = ctx
            .analyzer
            .fingerprints(video, info, options, &frames_dir)?;

        ctx.logger.info(&format!(
            "{} cuts, {} hashed ({})",
            set.len(),
            set.hashed_count(),
            frames_dir.display()
        ));
        if set.hashed_count() < set.len() {
            ctx.logger.warn(&format!(
                "{} {} stills could not be hashed and will not match",
                set.len() - set.hashed_count(),
                side
            ));
        }
        Ok(set)
    }
}

impl Default for FingerprintStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for FingerprintStep {
    fn name(&self) -> &str {
        "Fingerprint"
    }

    fn description(&self) -> &str {
        "Detect and hash scene cuts"
    }

    fn validate_input(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        if !state.has_probe() {
            return Err(StepError::precondition_failed("Videos have not been probed"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        let probe = state
            .probe
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Videos have not been probed"))?;
        let fingerprint = &ctx.settings.fingerprint;

        let source = self.fingerprint_side(
            ctx,
            "source",
            &ctx.spec.source_video,
            &probe.source,
            &fingerprint.source_options(),
        )?;
        let target = self.fingerprint_side(
            ctx,
            "target",
            &ctx.spec.target_video,
            &probe.target,
            &fingerprint.target_options(),
        )?;

        let output = FingerprintOutput { source, target };
        state.fingerprint_counts = Some(FingerprintCounts::from_output(&output));
        state.fingerprints = Some(output);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        match &state.fingerprints {
            Some(output) if !output.source.is_empty() && !output.target.is_empty() => Ok(()),
            Some(_) => Err(StepError::invalid_output("A video produced no scene cuts")),
            None => Err(StepError::invalid_output("Fingerprints not recorded")),
        }
    }
}
