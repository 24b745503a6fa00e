//! Core types for the orchestrator pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alignment::{AcceptAll, Correspondence, CurationGate, SafeFrameSelector};
use crate::config::Settings;
use crate::fingerprint::{FfmpegAnalyzer, MediaAnalyzer};
use crate::logging::SessionLogger;
use crate::models::{
    CorrespondencePair, FingerprintSet, MediaInfo, SafeFrames, SyncTarget, TimingCurve,
};
use crate::subtitles::RemapStats;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// What one sync session works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSpec {
    /// Which track gets re-timed.
    pub target: SyncTarget,
    /// Video whose audio or subtitles are in the wrong timing.
    pub source_video: PathBuf,
    /// Video with the right timing.
    pub target_video: PathBuf,
    /// Subtitle file to re-time, for `SyncTarget::Subtitles`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_path: Option<PathBuf>,
}

impl SessionSpec {
    /// Spec for re-timing the source's audio.
    pub fn audio(source_video: impl Into<PathBuf>, target_video: impl Into<PathBuf>) -> Self {
        Self {
            target: SyncTarget::Audio,
            source_video: source_video.into(),
            target_video: target_video.into(),
            subtitle_path: None,
        }
    }

    /// Spec for re-timing a subtitle file.
    pub fn subtitles(
        source_video: impl Into<PathBuf>,
        target_video: impl Into<PathBuf>,
        subtitle_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target: SyncTarget::Subtitles,
            source_video: source_video.into(),
            target_video: target_video.into(),
            subtitle_path: Some(subtitle_path.into()),
        }
    }

    /// Session name derived from the source video's file stem.
    pub fn session_name(&self) -> String {
        self.source_video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string())
    }
}

/// Read-only context passed to pipeline steps.
///
/// Contains session configuration and shared collaborators that steps can
/// read but not modify. Mutable state goes in `SessionState`.
pub struct Context {
    /// Session specification (inputs, sync target).
    pub spec: SessionSpec,
    /// Application settings.
    pub settings: Settings,
    /// Session name/identifier.
    pub session_name: String,
    /// Session working directory (stills, preview, session dump), usually
    /// `<frames_root>/<session>`.
    pub work_dir: PathBuf,
    /// Directory for the time map and the stretched audio.
    pub output_dir: PathBuf,
    /// Per-session logger.
    pub logger: Arc<SessionLogger>,
    /// Probing and fingerprinting backend.
    pub analyzer: Box<dyn MediaAnalyzer>,
    /// Picks the safe frames once fingerprints exist.
    pub safe_frame_selector: Option<Box<dyn SafeFrameSelector>>,
    /// Vetoes correspondences before the curve is built.
    pub curation_gate: Box<dyn CurationGate>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a session.
    ///
    /// The analyzer defaults to ffmpeg with the configured tool paths and the
    /// curation gate to `AcceptAll`. A safe-frame selector must be set
    /// before the pipeline reaches the SafeFrames step.
    pub fn new(
        spec: SessionSpec,
        settings: Settings,
        session_name: impl Into<String>,
        work_dir: PathBuf,
        output_dir: PathBuf,
        logger: Arc<SessionLogger>,
    ) -> Self {
        let analyzer = FfmpegAnalyzer::new(settings.tools.analyzer_tools());
        Self {
            spec,
            settings,
            session_name: session_name.into(),
            work_dir,
            output_dir,
            logger,
            analyzer: Box::new(analyzer),
            safe_frame_selector: None,
            curation_gate: Box::new(AcceptAll),
            progress_callback: None,
        }
    }

    /// Replace the media analyzer.
    pub fn with_analyzer(mut self, analyzer: Box<dyn MediaAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Set the safe-frame selector.
    pub fn with_safe_frame_selector(mut self, selector: Box<dyn SafeFrameSelector>) -> Self {
        self.safe_frame_selector = Some(selector);
        self
    }

    /// Replace the curation gate.
    pub fn with_curation_gate(mut self, gate: Box<dyn CurationGate>) -> Self {
        self.curation_gate = gate;
        self
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Log progress to the session log (thinned by `progress_step` in
    /// compact mode) and pass it to the callback, if set.
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        self.logger.progress(percent);
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// Folder holding the stills of one side.
    pub fn frames_dir(&self, side: &str) -> PathBuf {
        self.work_dir.join(side)
    }

    /// Path of the curation preview.
    pub fn preview_path(&self) -> PathBuf {
        self.work_dir.join(&self.settings.paths.preview_file)
    }

    /// Path of the session dump.
    pub fn session_json_path(&self) -> PathBuf {
        self.work_dir.join("session.json")
    }

    /// Subtitle input, if this is a subtitle session.
    pub fn subtitle_path(&self) -> Option<&Path> {
        self.spec.subtitle_path.as_deref()
    }
}

/// Mutable session state that accumulates results from pipeline steps.
///
/// Each step writes its own section once. Fingerprint sets are kept out of
/// the JSON dump; their sizes are recorded in the probe and fingerprint
/// sections instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique session identifier.
    pub session_id: String,
    /// When the session started.
    pub started_at: Option<String>,
    /// Probe results (from Probe step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeOutput>,
    /// Scene fingerprints (from Fingerprint step).
    #[serde(skip)]
    pub fingerprints: Option<FingerprintOutput>,
    /// Fingerprint counts, for the session dump.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint_counts: Option<FingerprintCounts>,
    /// Confirmed safe frames (from SafeFrames step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_frames: Option<SafeFrames>,
    /// Matched and filtered pairs (from Match step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correspondence: Option<Correspondence>,
    /// Pairs left after curation (from Curate step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curated: Option<CurationOutput>,
    /// The timing curve (from Curve step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<TimingCurve>,
    /// Written artifacts (from Export step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportOutput>,
}

impl SessionState {
    /// Create a new session state with the given ID.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn has_probe(&self) -> bool {
        self.probe.is_some()
    }

    pub fn has_fingerprints(&self) -> bool {
        self.fingerprints.is_some()
    }

    pub fn has_curve(&self) -> bool {
        self.curve.is_some()
    }
}

/// Output from the Probe step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutput {
    pub source: MediaInfo,
    pub target: MediaInfo,
}

/// Output from the Fingerprint step.
#[derive(Debug, Clone, Default)]
pub struct FingerprintOutput {
    pub source: FingerprintSet,
    pub target: FingerprintSet,
}

/// Scene cut and hash counts per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintCounts {
    pub source_cuts: usize,
    pub source_hashed: usize,
    pub target_cuts: usize,
    pub target_hashed: usize,
}

impl FingerprintCounts {
    pub fn from_output(output: &FingerprintOutput) -> Self {
        Self {
            source_cuts: output.source.len(),
            source_hashed: output.source.hashed_count(),
            target_cuts: output.target.len(),
            target_hashed: output.target.hashed_count(),
        }
    }
}

/// Output from the Curate step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationOutput {
    /// Pairs that go into the curve, safe bounds included.
    pub pairs: Vec<CorrespondencePair>,
    /// How many pairs the gate removed.
    pub removed: usize,
    /// Preview written for the gate, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PathBuf>,
}

/// Output from the Export step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportOutput {
    /// Written time map (audio sessions).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_map: Option<PathBuf>,
    /// Stretched audio (audio sessions with stretching enabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
    /// Re-timed subtitles (subtitle sessions).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<PathBuf>,
    /// Subtitle remap counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remap: Option<RemapStats>,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}
