//! Curve step - builds the timing curve from the curated pairs.

use crate::alignment::{build_curve, AlignError, CurveParams};
use crate::models::{CurveUnit, SpeedMode, SyncTarget};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, SessionState, StepOutcome};

/// Curve parameters for this session: sample units for audio,
/// milliseconds for subtitles.
pub(crate) fn curve_params(ctx: &Context, state: &SessionState) -> StepResult<CurveParams> {
    let probe = state
        .probe
        .as_ref()
        .ok_or_else(|| StepError::precondition_failed("Videos have not been probed"))?;
    let safe_frames = state
        .safe_frames
        .ok_or_else(|| StepError::precondition_failed("No safe frames"))?;

    let unit = match ctx.spec.target {
        SyncTarget::Audio => CurveUnit::AudioSamples {
            sample_rate: probe
                .source
                .audio_sample_rate
                .ok_or(AlignError::MissingAudio)?,
        },
        SyncTarget::Subtitles => CurveUnit::Milliseconds,
    };

    Ok(CurveParams {
        unit,
        source_fps: probe.source.fps,
        target_fps: probe.target.fps,
        source_duration_secs: probe.source.duration_secs,
        safe_frames,
        retiming: ctx.settings.alignment.retiming_for(ctx.spec.target),
    })
}

pub struct CurveStep;

impl CurveStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurveStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CurveStep {
    fn name(&self) -> &str {
        "Curve"
    }

    fn description(&self) -> &str {
        "Build the timing curve"
    }

    fn validate_input(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        if !state.has_fingerprints() {
            return Err(StepError::precondition_failed("No fingerprints"));
        }
        if ctx.settings.alignment.speed_mode == SpeedMode::Dynamic && state.curated.is_none() {
            return Err(StepError::precondition_failed("Pairs have not been curated"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        let params = curve_params(ctx, state)?;
        let fingerprints = state
            .fingerprints
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("No fingerprints"))?;

        // fixed speed: the safe bounds alone
        let pairs = match ctx.settings.alignment.speed_mode {
            SpeedMode::Fixed => Vec::new(),
            SpeedMode::Dynamic => state
                .curated
                .as_ref()
                .map(|c| c.pairs.clone())
                .unwrap_or_default(),
        };

        let curve = build_curve(&pairs, &fingerprints.source, &fingerprints.target, &params)?;

        let ratios = curve.segment_ratios();
        let fastest = ratios.iter().copied().fold(0.0_f64, f64::max);
        ctx.logger.info(&format!(
            "{} anchors in {}, fastest segment {:.3}x{}",
            curve.len(),
            params.unit.label(),
            fastest,
            if params.retiming.enabled {
                format!(" (cap {:.2}x)", params.retiming.max_speed_ratio)
            } else {
                String::new()
            }
        ));
        if let Some((start, end)) = curve.coverage() {
            ctx.logger.debug(&format!("Curve covers {:.0}..{:.0}", start, end));
        }

        state.curve = Some(curve);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        match &state.curve {
            Some(curve) if curve.len() >= 2 => Ok(()),
            Some(_) => Err(StepError::invalid_output("Curve has fewer than two anchors")),
            None => Err(StepError::invalid_output("Curve not recorded")),
        }
    }
}
