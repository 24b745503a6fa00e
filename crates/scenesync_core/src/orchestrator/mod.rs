//! Pipeline orchestrator for running one sync session.
//!
//! A session re-times the audio or subtitles of a source video against a
//! target video. Each phase is a step that validates, executes and records
//! its results in `SessionState`.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Probe
//!     ├── Step: Fingerprint
//!     ├── Step: SafeFrames
//!     ├── Step: Match      (skipped in fixed speed mode)
//!     ├── Step: Curate     (skipped in fixed speed mode)
//!     ├── Step: Curve
//!     └── Step: Export
//! ```
//!
//! # Example
//!
//! ```ignore
//! use scenesync_core::orchestrator::{create_standard_pipeline, Context, SessionSpec, SessionState};
//!
//! let spec = SessionSpec::audio("dvd.mkv", "bluray.mkv");
//! let ctx = Context::new(spec, settings, "dvd", work_dir, output_dir, logger)
//!     .with_safe_frame_selector(Box::new(FixedSafeFrames(safe)));
//! let mut state = SessionState::new("dvd");
//!
//! let result = create_standard_pipeline().run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{
    CurateStep, CurveStep, ExportStep, FingerprintStep, MatchStep, ProbeStep, SafeFramesStep,
};
pub use types::{
    Context, CurationOutput, ExportOutput, FingerprintCounts, FingerprintOutput, ProbeOutput,
    ProgressCallback, SessionSpec, SessionState, StepOutcome,
};

/// Create a standard pipeline with all steps in the correct order.
///
/// 1. Probe - check inputs, read stream properties
/// 2. Fingerprint - detect and hash scene cuts
/// 3. SafeFrames - confirm matching cuts near start and end
/// 4. Match - nearest-twin matching and consistency filtering
/// 5. Curate - preview and curation gate
/// 6. Curve - build the timing curve
/// 7. Export - time map and audio stretch, or re-timed subtitles
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ProbeStep::new())
        .with_step(FingerprintStep::new())
        .with_step(SafeFramesStep::new())
        .with_step(MatchStep::new())
        .with_step(CurateStep::new())
        .with_step(CurveStep::new())
        .with_step(ExportStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use tempfile::{tempdir, TempDir};

    use crate::alignment::{FixedRemovals, FixedSafeFrames};
    use crate::config::Settings;
    use crate::fingerprint::{FingerprintError, FingerprintOptions, MediaAnalyzer};
    use crate::logging::{init_test_tracing, LogConfig, SessionLogger};
    use crate::models::{
        Fingerprint, FingerprintSet, MediaInfo, PerceptualHash, SafeFrames, SpeedMode,
    };

    const CUTS: usize = 10;

    /// Source cuts every second; the target runs at half speed with a
    /// 500 ms lead, so target_ms = 2 * source_ms + 500.
    struct FakeAnalyzer {
        source: PathBuf,
    }

    impl FakeAnalyzer {
        fn is_source(&self, path: &Path) -> bool {
            path == self.source
        }
    }

    impl MediaAnalyzer for FakeAnalyzer {
        fn probe(&self, path: &Path) -> Result<MediaInfo, FingerprintError> {
            let source = self.is_source(path);
            Ok(MediaInfo {
                fps: 25.0,
                time_base: 1000,
                duration_secs: if source { 10.0 } else { 20.5 },
                audio_sample_rate: Some(48000),
                audio_codec: Some("aac".to_string()),
            })
        }

        fn fingerprints(
            &self,
            video: &Path,
            info: &MediaInfo,
            _options: &FingerprintOptions,
            frames_dir: &Path,
        ) -> Result<FingerprintSet, FingerprintError> {
            fs::create_dir_all(frames_dir).map_err(|e| FingerprintError::io("create", e))?;
            let source = self.is_source(video);
            let fingerprints = (0..CUTS)
                .map(|i| {
                    let ms = i as i64 * 1000;
                    let pts = if source { ms } else { 2 * ms + 500 };
                    Fingerprint::from_pts(i, pts, info.fps, info.time_base)
                        .with_hash(PerceptualHash::from_bytes(vec![(i * 25) as u8]))
                })
                .collect();
            Ok(FingerprintSet::new(video, info.fps, info.time_base, fingerprints))
        }
    }

    struct Session {
        dir: TempDir,
        source: PathBuf,
        target: PathBuf,
    }

    fn session() -> Session {
        init_test_tracing();
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.mkv");
        let target = dir.path().join("target.mkv");
        fs::write(&source, b"").unwrap();
        fs::write(&target, b"").unwrap();
        Session {
            dir,
            source,
            target,
        }
    }

    fn context(session: &Session, spec: SessionSpec, settings: Settings) -> Context {
        let root = session.dir.path();
        let logger =
            SessionLogger::new("test", root.join("logs"), LogConfig::default(), None).unwrap();
        Context::new(
            spec,
            settings,
            "test",
            root.join("work"),
            root.join("out"),
            Arc::new(logger),
        )
        .with_analyzer(Box::new(FakeAnalyzer {
            source: session.source.clone(),
        }))
        .with_safe_frame_selector(Box::new(FixedSafeFrames(SafeFrames::new(
            (0, 0),
            (CUTS - 1, CUTS - 1),
        ))))
    }

    fn audio_settings() -> Settings {
        let mut settings = Settings::default();
        settings.export.run_stretch = false;
        settings
    }

    #[test]
    fn standard_pipeline_has_all_steps() {
        let pipeline = create_standard_pipeline();
        assert_eq!(
            pipeline.step_names(),
            vec!["Probe", "Fingerprint", "SafeFrames", "Match", "Curate", "Curve", "Export"]
        );
    }

    #[test]
    fn subtitle_session_retimes_cues() {
        let session = session();
        let subs = session.dir.path().join("movie.srt");
        fs::write(
            &subs,
            "1\n00:00:01,000 --> 00:00:02,000\nFirst\n\n2\n00:00:09,500 --> 00:00:09,800\nLast\n",
        )
        .unwrap();

        let spec = SessionSpec::subtitles(&session.source, &session.target, &subs);
        let ctx = context(&session, spec, Settings::default());
        let mut state = SessionState::new("test");

        let result = create_standard_pipeline().run(&ctx, &mut state).unwrap();
        assert!(result.all_completed());

        let output = session.dir.path().join("movie.srt.srt");
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "1\n00:00:02,500 --> 00:00:04,500\nFirst\n\n\
             2\n00:00:19,500 --> 00:00:20,100\nLast\n"
        );

        let export = state.export.as_ref().unwrap();
        assert_eq!(export.subtitles.as_deref(), Some(output.as_path()));
        assert!(ctx.preview_path().exists());
        assert!(ctx.session_json_path().exists());
    }

    #[test]
    fn audio_session_writes_time_map() {
        let session = session();
        let spec = SessionSpec::audio(&session.source, &session.target);
        let ctx = context(&session, spec, audio_settings());
        let mut state = SessionState::new("test");

        create_standard_pipeline().run(&ctx, &mut state).unwrap();

        let map_path = session.dir.path().join("out").join("timecodes.txt");
        let map = fs::read_to_string(&map_path).unwrap();
        let sources: Vec<i64> = map
            .lines()
            .map(|line| line.split(' ').next().unwrap().parse().unwrap())
            .collect();
        assert!(sources.len() >= CUTS);
        assert!(sources.windows(2).all(|w| w[0] < w[1]));
        assert!(state.export.as_ref().unwrap().audio.is_none());

        // 2x segments exceed the default cap, so every one gets a breakpoint
        let curve = state.curve.as_ref().unwrap();
        assert!(curve.len() > CUTS + 1);
    }

    #[test]
    fn fixed_speed_skips_matching() {
        let session = session();
        let mut settings = audio_settings();
        settings.alignment.speed_mode = SpeedMode::Fixed;
        settings.alignment.retime_audio = false;

        let spec = SessionSpec::audio(&session.source, &session.target);
        let ctx = context(&session, spec, settings);
        let mut state = SessionState::new("test");

        let result = create_standard_pipeline().run(&ctx, &mut state).unwrap();
        assert_eq!(result.steps_skipped, vec!["Match", "Curate"]);
        assert!(state.correspondence.is_none());

        let ratios = state.curve.as_ref().unwrap().segment_ratios();
        assert!(ratios.iter().skip(1).all(|r| (r - 2.0).abs() < 1e-9));
    }

    #[test]
    fn curation_gate_removes_pairs_by_index() {
        let session = session();
        let spec = SessionSpec::audio(&session.source, &session.target);
        let ctx = context(&session, spec, audio_settings())
            .with_curation_gate(Box::new(FixedRemovals::parse("3,4,99")));
        let mut state = SessionState::new("test");

        create_standard_pipeline().run(&ctx, &mut state).unwrap();

        let curated = state.curated.as_ref().unwrap();
        assert_eq!(curated.removed, 2);
        assert_eq!(curated.pairs.len(), CUTS - 2);
        assert!(curated.pairs.iter().all(|p| p.main_index != 3 && p.main_index != 4));
    }

    #[test]
    fn missing_input_fails_at_probe() {
        let session = session();
        let spec = SessionSpec::audio(session.dir.path().join("missing.mkv"), &session.target);
        let ctx = context(&session, spec, audio_settings());
        let mut state = SessionState::new("test");

        let err = create_standard_pipeline().run(&ctx, &mut state).unwrap_err();
        match &err {
            PipelineError::StepFailed { step_name, .. } => assert_eq!(step_name, "Probe"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.step_error(), Some(StepError::FileNotFound { .. })));
        assert!(!state.has_fingerprints());
    }

    #[test]
    fn missing_selector_is_a_precondition_failure() {
        let session = session();
        let root = session.dir.path();
        let logger = SessionLogger::new("t", root, LogConfig::default(), None).unwrap();
        let ctx = Context::new(
            SessionSpec::audio(&session.source, &session.target),
            audio_settings(),
            "t",
            root.join("work"),
            root.join("out"),
            Arc::new(logger),
        )
        .with_analyzer(Box::new(FakeAnalyzer {
            source: session.source.clone(),
        }));
        let mut state = SessionState::new("t");

        let err = create_standard_pipeline().run(&ctx, &mut state).unwrap_err();
        assert!(matches!(
            err.step_error(),
            Some(StepError::PreconditionFailed(_))
        ));
    }
}
