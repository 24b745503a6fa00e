//! Scene Sync command line tool.
//!
//! Usage:
//!   scene-sync audio --source-path dvd.mkv --target-path bd.mkv
//!   scene-sync subs --source-path dvd.mkv --target-path bd.mkv --subtitle-path dvd.ass

mod cli;
mod prompts;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;

use scenesync_core::alignment::{
    AcceptAll, CurationGate, FixedRemovals, FixedSafeFrames, SafeFrameSelector,
};
use scenesync_core::config::{ConfigManager, Settings};
use scenesync_core::logging::{
    self, sanitize_filename, LogConfig, LogLevel, SessionLoggerBuilder,
};
use scenesync_core::models::{SafeFrames, SpeedMode};
use scenesync_core::orchestrator::{
    create_standard_pipeline, Context, ProgressCallback, SessionSpec, SessionState,
};

use cli::{Cli, Command, CommonArgs};
use prompts::{PromptCuration, PromptSafeFrames};

/// File the library's tracing output is copied to, inside the logs folder.
const TRACE_FILE: &str = "scene-sync.trace.log";

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Apply command line overrides to the loaded settings (in memory only).
fn apply_overrides(settings: &mut Settings, common: &CommonArgs) {
    let fingerprint = &mut settings.fingerprint;
    fingerprint.source_cut_borders |= common.source_cut_borders;
    fingerprint.target_cut_borders |= common.target_cut_borders;
    if let Some(pct) = common.frame_diff_percentage {
        fingerprint.scene_threshold_pct = pct;
    }

    let tools = &mut settings.tools;
    for (slot, value) in [
        (&mut tools.ffmpeg, &common.ffmpeg),
        (&mut tools.ffprobe, &common.ffprobe),
        (&mut tools.rubberband, &common.rubberband),
        (&mut tools.magick, &common.imagemagick),
    ] {
        if let Some(value) = value {
            *slot = value.clone();
        }
    }

    if common.fixed_speed {
        settings.alignment.speed_mode = SpeedMode::Fixed;
    }
    settings.export.clean_frames |= common.clean_frames;
}

fn safe_frame_selector(common: &CommonArgs) -> Box<dyn SafeFrameSelector> {
    match (common.safe_start, common.safe_end) {
        (Some(start), Some(end)) => Box::new(FixedSafeFrames(SafeFrames::new(start, end))),
        (start, end) => Box::new(PromptSafeFrames { start, end }),
    }
}

fn curation_gate(common: &CommonArgs, preview: PathBuf) -> Box<dyn CurationGate> {
    if common.no_curation {
        Box::new(AcceptAll)
    } else if let Some(list) = &common.remove {
        Box::new(FixedRemovals::parse(list))
    } else {
        Box::new(PromptCuration { preview })
    }
}

/// Step progress goes to the trace log; the session log gets its own
/// `Progress:` lines from the pipeline.
fn progress_callback() -> ProgressCallback {
    Box::new(|step: &str, percent: u32, message: &str| {
        tracing::debug!("[Progress] {} {}%: {}", step, percent, message);
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.ensure_dirs_exist()?;

    let _trace_guard =
        match logging::init_tracing_with_file(level, &config.logs_folder(), TRACE_FILE) {
            Ok(guard) => Some(guard),
            Err(e) => {
                logging::init_tracing(level);
                tracing::warn!("[Log] trace file unavailable, logging to stderr only: {}", e);
                None
            }
        };

    let (spec, common) = match cli.command {
        Command::Audio { common, no_stretch } => {
            if no_stretch {
                config.settings_mut().export.run_stretch = false;
            }
            (
                SessionSpec::audio(&common.source_path, &common.target_path),
                common,
            )
        }
        Command::Subs {
            common,
            subtitle_path,
        } => (
            SessionSpec::subtitles(&common.source_path, &common.target_path, subtitle_path),
            common,
        ),
    };
    apply_overrides(config.settings_mut(), &common);

    let session_name = spec.session_name();
    let work_dir = config.frames_root().join(sanitize_filename(&session_name));
    let output_dir = parent_dir(&spec.source_video);
    let logs_folder = config.logs_folder();
    let settings = config.into_settings();

    let logger = SessionLoggerBuilder::new(&session_name, logs_folder)
        .config(LogConfig::from(&settings.logging))
        .level(level)
        .callback(Box::new(|line: &str| println!("{}", line)))
        .build()
        .context("creating session log")?;
    let logger = Arc::new(logger);

    let selector = safe_frame_selector(&common);
    let preview = work_dir.join(&settings.paths.preview_file);
    let gate = curation_gate(&common, preview);

    let ctx = Context::new(
        spec,
        settings,
        &session_name,
        work_dir,
        output_dir,
        Arc::clone(&logger),
    )
    .with_safe_frame_selector(selector)
    .with_curation_gate(gate)
    .with_progress_callback(progress_callback());

    let mut state = SessionState::new(&session_name);
    let result = create_standard_pipeline().run(&ctx, &mut state);
    logger.close();
    let result = result?;

    tracing::debug!(
        "completed {:?}, skipped {:?}",
        result.steps_completed,
        result.steps_skipped
    );

    if let Some(export) = &state.export {
        for path in [&export.time_map, &export.audio, &export.subtitles]
            .into_iter()
            .flatten()
        {
            println!("Wrote {}", path.display());
        }
    }
    println!("Log: {}", logger.log_path().display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(args: &[&str]) -> CommonArgs {
        let mut argv = vec![
            "scene-sync",
            "audio",
            "--source-path",
            "a.mkv",
            "--target-path",
            "b.mkv",
        ];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Audio { common, .. } => common,
            Command::Subs { common, .. } => common,
        }
    }

    #[test]
    fn overrides_only_touch_given_flags() {
        let mut settings = Settings::default();
        apply_overrides(
            &mut settings,
            &common(&[
                "--frame-diff-percentage",
                "25",
                "--ffmpeg",
                "/opt/ffmpeg",
                "--fixed-speed",
            ]),
        );

        assert_eq!(settings.fingerprint.scene_threshold_pct, 25.0);
        assert_eq!(settings.tools.ffmpeg, "/opt/ffmpeg");
        assert_eq!(settings.tools.ffprobe, Settings::default().tools.ffprobe);
        assert_eq!(settings.alignment.speed_mode, SpeedMode::Fixed);
        assert!(!settings.fingerprint.source_cut_borders);
    }

    #[test]
    fn parent_of_bare_file_is_cwd() {
        assert_eq!(parent_dir(Path::new("movie.mkv")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/media/movie.mkv")), PathBuf::from("/media"));
    }
}
