//! Probe step - checks the inputs and reads stream properties.

use std::path::Path;

use crate::models::SyncTarget;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ProbeOutput, SessionState, StepOutcome};

/// Probe step: fails fast on missing inputs, then records `MediaInfo` for
/// both videos.
pub struct ProbeStep;

impl ProbeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProbeStep {
    fn default() -> Self {
        Self::new()
    }
}

fn require_file(path: &Path) -> StepResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StepError::file_not_found(path.display().to_string()))
    }
}

impl PipelineStep for ProbeStep {
    fn name(&self) -> &str {
        "Probe"
    }

    fn description(&self) -> &str {
        "Read stream properties of both videos"
    }

    fn validate_input(&self, ctx: &Context, _state: &SessionState) -> StepResult<()> {
        require_file(&ctx.spec.source_video)?;
        require_file(&ctx.spec.target_video)?;

        if ctx.spec.target == SyncTarget::Subtitles {
            let subtitles = ctx
                .subtitle_path()
                .ok_or_else(|| StepError::invalid_input("No subtitle file given"))?;
            require_file(subtitles)?;
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        let source = ctx.analyzer.probe(&ctx.spec.source_video)?;
        ctx.logger.info(&format!(
            "Source: {:.3} fps, {:.3}s, audio {}",
            source.fps,
            source.duration_secs,
            match (&source.audio_codec, source.audio_sample_rate) {
                (Some(codec), Some(rate)) => format!("{} @ {} Hz", codec, rate),
                _ => "none".to_string(),
            }
        ));

        let target = ctx.analyzer.probe(&ctx.spec.target_video)?;
        ctx.logger.info(&format!(
            "Target: {:.3} fps, {:.3}s",
            target.fps, target.duration_secs
        ));

        if (source.fps - target.fps).abs() > f64::EPSILON {
            ctx.logger.info(&format!(
                "Frame rates differ ({:.3} vs {:.3})",
                source.fps, target.fps
            ));
        }

        state.probe = Some(ProbeOutput { source, target });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let probe = state
            .probe
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Probe results not recorded"))?;

        if probe.source.duration_secs <= 0.0 || probe.target.duration_secs <= 0.0 {
            return Err(StepError::invalid_output("Media duration must be positive"));
        }
        if ctx.spec.target == SyncTarget::Audio && probe.source.audio_sample_rate.is_none() {
            return Err(crate::alignment::AlignError::MissingAudio.into());
        }
        Ok(())
    }
}
