//! Export step - writes the curve out for its consumer.
//!
//! Audio sessions get `timecodes.txt` and, when enabled, the
//! extract/convert/rubberband chain. Subtitle sessions get the re-timed
//! cues as `<input>.srt`. Both may dump `session.json` and clear the
//! extracted stills afterwards.

use std::fs;

use crate::export::{plan_audio_stretch, write_time_map, StretchRequest, TIME_MAP_FILE};
use crate::fingerprint::clear_frame_cache;
use crate::models::{SyncTarget, TimingCurve};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ExportOutput, SessionState, StepOutcome};
use crate::subtitles::{parse_file, remap_subtitles, synced_output_path, write_file};

pub struct ExportStep;

impl ExportStep {
    pub fn new() -> Self {
        Self
    }

    fn export_audio(
        &self,
        ctx: &Context,
        state: &SessionState,
        curve: &TimingCurve,
    ) -> StepResult<ExportOutput> {
        fs::create_dir_all(&ctx.output_dir)
            .map_err(|e| StepError::io_error("creating output directory", e))?;

        let time_map = ctx.output_dir.join(TIME_MAP_FILE);
        write_time_map(curve, &time_map)?;
        ctx.logger
            .info(&format!("Time map written to {}", time_map.display()));

        let mut output = ExportOutput {
            time_map: Some(time_map.clone()),
            ..ExportOutput::default()
        };

        if !ctx.settings.export.run_stretch {
            ctx.logger.info("Audio stretching disabled");
            return Ok(output);
        }

        let probe = state
            .probe
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Videos have not been probed"))?;
        let sample_rate = probe
            .source
            .audio_sample_rate
            .ok_or(crate::export::ExportError::NoAudio)?;

        fs::create_dir_all(&ctx.work_dir)
            .map_err(|e| StepError::io_error("creating work directory", e))?;

        let request = StretchRequest {
            source_video: &ctx.spec.source_video,
            target_video: &ctx.spec.target_video,
            audio_codec: probe.source.audio_codec.as_deref(),
            sample_rate,
            time_map: &time_map,
            duration_ratio: probe.target.duration_secs / probe.source.duration_secs,
            work_dir: &ctx.work_dir,
            output_dir: &ctx.output_dir,
        };
        let plan = plan_audio_stretch(&ctx.settings.tools.stretch_tools(), &request)?;

        ctx.logger.section("Stretching audio");
        for command in &plan.commands {
            ctx.logger.run_command(command)?;
        }
        ctx.logger
            .info(&format!("Stretched audio: {}", plan.output.display()));

        output.audio = Some(plan.output);
        Ok(output)
    }

    fn export_subtitles(&self, ctx: &Context, curve: &TimingCurve) -> StepResult<ExportOutput> {
        let input = ctx
            .subtitle_path()
            .ok_or_else(|| StepError::invalid_input("No subtitle file given"))?;

        let mut data = parse_file(input)?;
        let stats = remap_subtitles(&mut data, curve);
        if stats.out_of_range > 0 {
            ctx.logger.warn(&format!(
                "{} timestamps outside the curve were left unchanged",
                stats.out_of_range
            ));
        }

        let output_path = synced_output_path(input);
        write_file(&data, &output_path)?;
        ctx.logger.info(&format!(
            "{} cues re-timed, written to {}",
            data.dialogue_count(),
            output_path.display()
        ));

        Ok(ExportOutput {
            subtitles: Some(output_path),
            remap: Some(stats),
            ..ExportOutput::default()
        })
    }

    fn write_session_json(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let path = ctx.session_json_path();
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StepError::io_error("serializing session", e.into()))?;
        fs::create_dir_all(&ctx.work_dir)
            .map_err(|e| StepError::io_error("creating work directory", e))?;
        fs::write(&path, json).map_err(|e| StepError::io_error("writing session.json", e))?;
        ctx.logger
            .debug(&format!("Session written to {}", path.display()));
        Ok(())
    }

    fn clean_frames(&self, ctx: &Context) {
        for side in ["source", "target"] {
            let dir = ctx.frames_dir(side);
            if !dir.exists() {
                continue;
            }
            match clear_frame_cache(&dir) {
                Ok(count) => ctx
                    .logger
                    .debug(&format!("Removed {} files from {}", count, dir.display())),
                Err(e) => ctx.logger.warn(&format!(
                    "Could not clear {}: {}",
                    dir.display(),
                    e
                )),
            }
        }
    }
}

impl Default for ExportStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExportStep {
    fn name(&self) -> &str {
        "Export"
    }

    fn description(&self) -> &str {
        "Write the time map or the re-timed subtitles"
    }

    fn validate_input(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        if !state.has_curve() {
            return Err(StepError::precondition_failed("No timing curve"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        let curve = state
            .curve
            .clone()
            .ok_or_else(|| StepError::precondition_failed("No timing curve"))?;

        let output = match ctx.spec.target {
            SyncTarget::Audio => self.export_audio(ctx, state, &curve)?,
            SyncTarget::Subtitles => self.export_subtitles(ctx, &curve)?,
        };
        state.export = Some(output);

        if ctx.settings.export.write_session_json {
            self.write_session_json(ctx, state)?;
        }
        if ctx.settings.export.clean_frames {
            self.clean_frames(ctx);
        }

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let output = state
            .export
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Export not recorded"))?;

        let written = match ctx.spec.target {
            SyncTarget::Audio => output.audio.as_ref().or(output.time_map.as_ref()),
            SyncTarget::Subtitles => output.subtitles.as_ref(),
        };
        match written {
            Some(path) if path.exists() => Ok(()),
            Some(path) => Err(StepError::invalid_output(format!(
                "{} was not created",
                path.display()
            ))),
            None => Err(StepError::invalid_output("Nothing was written")),
        }
    }
}
