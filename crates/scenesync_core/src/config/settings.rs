//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::alignment::{RetimingPolicy, DEFAULT_MAX_SPEED_RATIO};
use crate::fingerprint::{AnalyzerTools, FingerprintOptions};
use crate::export::StretchTools;
use crate::models::{HashAlgorithm, SpeedMode, SyncTarget};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Scene detection and hashing.
    #[serde(default)]
    pub fingerprint: FingerprintSettings,

    /// Matching and curve building.
    #[serde(default)]
    pub alignment: AlignmentSettings,

    /// External program names or paths.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Artifacts written at the end of a session.
    #[serde(default)]
    pub export: ExportSettings,
}

/// Working folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for extracted stills; each session gets a subfolder.
    #[serde(default = "default_frames_root")]
    pub frames_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// File name of the curation preview inside the session folder.
    #[serde(default = "default_preview_file")]
    pub preview_file: String,
}

fn default_frames_root() -> String {
    "frames".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_preview_file() -> String {
    "preview.html".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            frames_root: default_frames_root(),
            logs_folder: default_logs_folder(),
            preview_file: default_preview_file(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of error lines to show in tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Prefix log lines with the time of day.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

/// Scene detection and hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintSettings {
    /// Scene change score, in percent, that starts a new scene.
    #[serde(default = "default_scene_threshold")]
    pub scene_threshold_pct: f64,

    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Hash side length (8 gives 64 bits).
    #[serde(default = "default_hash_size")]
    pub hash_size: u8,

    /// Trim black borders from source stills before hashing.
    #[serde(default)]
    pub source_cut_borders: bool,

    /// Trim black borders from target stills before hashing.
    #[serde(default)]
    pub target_cut_borders: bool,

    /// ImageMagick fuzz factor for border trimming, in percent.
    #[serde(default = "default_border_fuzz")]
    pub border_fuzz_pct: f64,
}

fn default_scene_threshold() -> f64 {
    30.0
}

fn default_hash_size() -> u8 {
    8
}

fn default_border_fuzz() -> f64 {
    4.0
}

impl Default for FingerprintSettings {
    fn default() -> Self {
        Self {
            scene_threshold_pct: default_scene_threshold(),
            hash_algorithm: HashAlgorithm::default(),
            hash_size: default_hash_size(),
            source_cut_borders: false,
            target_cut_borders: false,
            border_fuzz_pct: default_border_fuzz(),
        }
    }
}

impl FingerprintSettings {
    /// Extraction options for one side of the session.
    pub fn options(&self, cut_borders: bool) -> FingerprintOptions {
        FingerprintOptions {
            scene_threshold_pct: self.scene_threshold_pct,
            cut_borders,
            border_fuzz_pct: self.border_fuzz_pct,
            hash_algorithm: self.hash_algorithm,
            hash_size: self.hash_size,
        }
    }

    pub fn source_options(&self) -> FingerprintOptions {
        self.options(self.source_cut_borders)
    }

    pub fn target_options(&self) -> FingerprintOptions {
        self.options(self.target_cut_borders)
    }
}

/// Matching and curve building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentSettings {
    #[serde(default)]
    pub speed_mode: SpeedMode,

    /// Largest local speed-up accepted before a segment is split.
    #[serde(default = "default_max_speed_ratio")]
    pub max_speed_ratio: f64,

    /// Apply the speed-up safeguard to audio curves.
    #[serde(default = "default_true")]
    pub retime_audio: bool,

    /// Apply the speed-up safeguard to subtitle curves.
    #[serde(default)]
    pub retime_subtitles: bool,
}

fn default_max_speed_ratio() -> f64 {
    DEFAULT_MAX_SPEED_RATIO
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self {
            speed_mode: SpeedMode::default(),
            max_speed_ratio: default_max_speed_ratio(),
            retime_audio: true,
            retime_subtitles: false,
        }
    }
}

impl AlignmentSettings {
    /// Retiming policy for a sync target.
    pub fn retiming_for(&self, target: SyncTarget) -> RetimingPolicy {
        let enabled = match target {
            SyncTarget::Audio => self.retime_audio,
            SyncTarget::Subtitles => self.retime_subtitles,
        };
        RetimingPolicy {
            enabled,
            max_speed_ratio: self.max_speed_ratio,
        }
    }
}

/// External program names or paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    #[serde(default = "default_rubberband")]
    pub rubberband: String,

    #[serde(default = "default_magick")]
    pub magick: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_rubberband() -> String {
    "rubberband".to_string()
}

fn default_magick() -> String {
    "magick".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            rubberband: default_rubberband(),
            magick: default_magick(),
        }
    }
}

impl ToolSettings {
    pub fn analyzer_tools(&self) -> AnalyzerTools {
        AnalyzerTools {
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            magick: self.magick.clone(),
        }
    }

    pub fn stretch_tools(&self) -> StretchTools {
        StretchTools {
            ffmpeg: self.ffmpeg.clone(),
            rubberband: self.rubberband.clone(),
        }
    }
}

/// Artifacts written at the end of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Run the ffmpeg/rubberband plan after writing the time map.
    #[serde(default = "default_true")]
    pub run_stretch: bool,

    /// Write the HTML curation preview.
    #[serde(default = "default_true")]
    pub write_preview: bool,

    /// Delete extracted stills when the session finishes.
    #[serde(default)]
    pub clean_frames: bool,

    /// Dump the session state as JSON next to the preview.
    #[serde(default = "default_true")]
    pub write_session_json: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            run_stretch: true,
            write_preview: true,
            clean_frames: false,
            write_session_json: true,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Fingerprint,
    Alignment,
    Tools,
    Export,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 6] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Fingerprint,
        ConfigSection::Alignment,
        ConfigSection::Tools,
        ConfigSection::Export,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Fingerprint => "fingerprint",
            ConfigSection::Alignment => "alignment",
            ConfigSection::Tools => "tools",
            ConfigSection::Export => "export",
        }
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Working folders",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Fingerprint => "Scene detection and still hashing",
            ConfigSection::Alignment => "Matching and timing curve",
            ConfigSection::Tools => "External programs (name on PATH or full path)",
            ConfigSection::Export => "Session output",
        }
    }
}
