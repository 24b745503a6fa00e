//! Scene-cut fingerprint source.
//!
//! Probes each video, extracts its scene cuts as stills with ffmpeg,
//! optionally trims black borders with ImageMagick and hashes every still.
//! The alignment engine only sees the resulting `FingerprintSet`; anything
//! that implements `MediaAnalyzer` can stand in for ffmpeg.

mod cache;
mod hash;
mod probe;
mod scenes;

pub use cache::clear_frame_cache;
pub use hash::{create_hasher, hash_file, hash_image, trim_borders_command};
pub use probe::{parse_frame_rate, parse_probe_json, parse_time_base, probe_command, probe_media};
pub use scenes::{
    parse_scene_metadata, scene_command, scene_image_path, SceneCut, SCENE_METADATA_FILE,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Fingerprint, FingerprintSet, HashAlgorithm, MediaInfo};
use crate::process::ProcessError;

/// Errors raised while probing or fingerprinting a video.
#[derive(Error, Debug)]
pub enum FingerprintError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// An external tool failed.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Filesystem error.
    #[error("Failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// ffprobe output could not be decoded.
    #[error("Failed to parse ffprobe output: {0}")]
    Json(#[from] serde_json::Error),

    /// ffprobe output lacked a required field.
    #[error("Probe failed: {0}")]
    Probe(String),

    /// The file has no video stream.
    #[error("no video stream found")]
    NoVideoStream,

    /// Scene detection found nothing.
    #[error("no scene cuts detected in {0}")]
    NoScenes(PathBuf),
}

impl FingerprintError {
    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// How stills are extracted and hashed for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintOptions {
    /// Scene change score, in percent, above which a frame starts a new scene.
    pub scene_threshold_pct: f64,
    /// Trim uniform borders from stills before hashing.
    pub cut_borders: bool,
    /// ImageMagick fuzz factor used when trimming, in percent.
    pub border_fuzz_pct: f64,
    pub hash_algorithm: HashAlgorithm,
    /// Hash side length (8 gives 64 bits).
    pub hash_size: u8,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            scene_threshold_pct: 30.0,
            cut_borders: false,
            border_fuzz_pct: 4.0,
            hash_algorithm: HashAlgorithm::AHash,
            hash_size: 8,
        }
    }
}

/// Source of media properties and scene fingerprints.
pub trait MediaAnalyzer {
    /// Read stream properties.
    fn probe(&self, path: &Path) -> Result<MediaInfo, FingerprintError>;

    /// Extract and hash every scene cut, writing stills to `frames_dir`.
    fn fingerprints(
        &self,
        video: &Path,
        info: &MediaInfo,
        options: &FingerprintOptions,
        frames_dir: &Path,
    ) -> Result<FingerprintSet, FingerprintError>;
}

/// Program names for the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerTools {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub magick: String,
}

impl Default for AnalyzerTools {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            magick: "magick".to_string(),
        }
    }
}

/// `MediaAnalyzer` backed by ffprobe, ffmpeg and ImageMagick.
#[derive(Debug, Clone, Default)]
pub struct FfmpegAnalyzer {
    tools: AnalyzerTools,
}

impl FfmpegAnalyzer {
    pub fn new(tools: AnalyzerTools) -> Self {
        Self { tools }
    }

    fn trim_borders(&self, options: &FingerprintOptions, images: &[PathBuf]) {
        if images.is_empty() {
            return;
        }
        let cmd = trim_borders_command(&self.tools.magick, options.border_fuzz_pct, images);
        if let Err(e) = cmd.run() {
            tracing::warn!("[Frames] border trimming failed, hashing untrimmed stills: {}", e);
        }
    }
}

impl MediaAnalyzer for FfmpegAnalyzer {
    fn probe(&self, path: &Path) -> Result<MediaInfo, FingerprintError> {
        probe_media(&self.tools.ffprobe, path)
    }

    fn fingerprints(
        &self,
        video: &Path,
        info: &MediaInfo,
        options: &FingerprintOptions,
        frames_dir: &Path,
    ) -> Result<FingerprintSet, FingerprintError> {
        fs::create_dir_all(frames_dir)
            .map_err(|e| FingerprintError::io(format!("create {}", frames_dir.display()), e))?;
        clear_frame_cache(frames_dir)
            .map_err(|e| FingerprintError::io(format!("clear {}", frames_dir.display()), e))?;

        // ffmpeg runs inside the frames folder, so the input must be absolute
        let video_abs = fs::canonicalize(video)
            .map_err(|_| FingerprintError::NotFound(video.to_path_buf()))?;

        tracing::info!(
            "[Frames] detecting scene cuts in {} (threshold {}%)",
            video.display(),
            options.scene_threshold_pct
        );
        scene_command(&self.tools.ffmpeg, &video_abs, options.scene_threshold_pct)
            .current_dir(frames_dir)
            .run()?;

        let metadata_path = frames_dir.join(SCENE_METADATA_FILE);
        let metadata = fs::read_to_string(&metadata_path)
            .map_err(|e| FingerprintError::io(format!("read {}", metadata_path.display()), e))?;
        let cuts = parse_scene_metadata(&metadata);
        if cuts.is_empty() {
            return Err(FingerprintError::NoScenes(video.to_path_buf()));
        }

        if options.cut_borders {
            let images: Vec<PathBuf> = cuts
                .iter()
                .map(|c| scene_image_path(frames_dir, c.frame))
                .filter(|p| p.exists())
                .collect();
            self.trim_borders(options, &images);
        }

        let hasher = create_hasher(options.hash_algorithm, options.hash_size);
        let fingerprints: Vec<Fingerprint> = cuts
            .iter()
            .map(|cut| {
                let image = scene_image_path(frames_dir, cut.frame);
                let mut fp = Fingerprint::from_pts(cut.frame, cut.pts, info.fps, info.time_base);
                if let Some(hash) = hash_file(&hasher, &image) {
                    fp = fp.with_hash(hash);
                }
                fp.with_image(image)
            })
            .collect();

        let set = FingerprintSet::new(video, info.fps, info.time_base, fingerprints);
        tracing::info!(
            "[Frames] {} scene cuts, {} hashed",
            set.len(),
            set.hashed_count()
        );
        Ok(set)
    }
}
