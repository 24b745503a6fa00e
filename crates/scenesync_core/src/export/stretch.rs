//! External audio stretch plan.
//!
//! The engine never touches audio itself. It produces a list of commands:
//! copy the source audio out of its container, convert it to something
//! rubberband can read when needed, then stretch it with the time map.

use std::path::{Path, PathBuf};

use super::error::{ExportError, ExportResult};
use crate::process::ExternalCommand;

/// Sample rates the Opus encoder accepts.
const OPUS_SAMPLE_RATES: [u32; 5] = [48000, 24000, 16000, 12000, 8000];

/// Program names for the stretch tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StretchTools {
    pub ffmpeg: String,
    pub rubberband: String,
}

impl Default for StretchTools {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            rubberband: "rubberband".to_string(),
        }
    }
}

/// Conversion applied between extraction and stretching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioConversion {
    /// Already readable.
    Keep,
    /// Transcode to Opus at 320k.
    Opus,
    /// Decode to PCM WAV.
    Wav,
}

impl AudioConversion {
    fn extension(&self) -> Option<&'static str> {
        match self {
            AudioConversion::Keep => None,
            AudioConversion::Opus => Some("opus"),
            AudioConversion::Wav => Some("wav"),
        }
    }
}

/// File extension for a stream copied out with `-acodec copy`.
pub fn codec_extension(codec: &str) -> String {
    let codec = codec.to_ascii_lowercase();
    if codec.starts_with("pcm_") {
        return "wav".to_string();
    }
    match codec.as_str() {
        "vorbis" => "ogg".to_string(),
        "truehd" => "thd".to_string(),
        _ => codec,
    }
}

/// Pick the conversion for a codec and sample rate.
///
/// Opus and WAV go straight through. Other codecs are transcoded to Opus
/// when the rate allows it, except AC-3 and AAC which always decode to WAV.
pub fn choose_conversion(codec: &str, sample_rate: u32) -> AudioConversion {
    match codec_extension(codec).as_str() {
        "opus" | "wav" => AudioConversion::Keep,
        "ac3" | "aac" => AudioConversion::Wav,
        _ if OPUS_SAMPLE_RATES.contains(&sample_rate) => AudioConversion::Opus,
        _ => AudioConversion::Wav,
    }
}

/// Inputs for `plan_audio_stretch`.
#[derive(Debug, Clone)]
pub struct StretchRequest<'a> {
    pub source_video: &'a Path,
    pub target_video: &'a Path,
    pub audio_codec: Option<&'a str>,
    pub sample_rate: u32,
    pub time_map: &'a Path,
    /// Target duration divided by source duration.
    pub duration_ratio: f64,
    /// Folder for intermediate files.
    pub work_dir: &'a Path,
    /// Folder the stretched track is written to.
    pub output_dir: &'a Path,
}

/// Ordered commands plus the file they produce.
#[derive(Debug, Clone)]
pub struct StretchPlan {
    pub commands: Vec<ExternalCommand>,
    pub output: PathBuf,
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string())
}

/// Build the extract/convert/stretch command list.
pub fn plan_audio_stretch(tools: &StretchTools, request: &StretchRequest<'_>) -> ExportResult<StretchPlan> {
    let codec = request.audio_codec.ok_or(ExportError::NoAudio)?;
    let source_stem = file_stem(request.source_video);
    let mut commands = Vec::new();

    let extracted = request
        .work_dir
        .join(format!("{}.{}", source_stem, codec_extension(codec)));
    commands.push(
        ExternalCommand::new(&tools.ffmpeg)
            .args(["-y", "-i"])
            .path_arg(request.source_video)
            .args(["-vn", "-acodec", "copy"])
            .path_arg(&extracted),
    );

    let conversion = choose_conversion(codec, request.sample_rate);
    let stretch_input = match conversion.extension() {
        None => extracted,
        Some(ext) => {
            let converted = request.work_dir.join(format!("{}.converted.{}", source_stem, ext));
            let mut cmd = ExternalCommand::new(&tools.ffmpeg)
                .args(["-y", "-i"])
                .path_arg(&extracted)
                .arg("-ar")
                .arg(request.sample_rate.to_string());
            if conversion == AudioConversion::Opus {
                cmd = cmd.args(["-c:a", "libopus", "-b:a", "320k"]);
            }
            commands.push(cmd.path_arg(&converted));
            converted
        }
    };

    let ext = stretch_input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wav".to_string());
    let output = request
        .output_dir
        .join(format!("{}.{}", file_stem(request.target_video), ext));

    commands.push(
        ExternalCommand::new(&tools.rubberband)
            .arg("--timemap")
            .path_arg(request.time_map)
            .arg("-t")
            .arg(format!("{}", request.duration_ratio))
            .path_arg(&stretch_input)
            .path_arg(&output),
    );

    tracing::debug!(
        "[Stretch] {} -> {:?} -> {}",
        codec,
        conversion,
        output.display()
    );

    Ok(StretchPlan { commands, output })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(codec: Option<&'a str>, rate: u32) -> StretchRequest<'a> {
        StretchRequest {
            source_video: Path::new("/media/old/Movie.mkv"),
            target_video: Path::new("/media/new/Movie BD.mkv"),
            audio_codec: codec,
            sample_rate: rate,
            time_map: Path::new("/media/old/timecodes.txt"),
            duration_ratio: 1.25,
            work_dir: Path::new("/work"),
            output_dir: Path::new("/media/new"),
        }
    }

    #[test]
    fn extensions() {
        assert_eq!(codec_extension("pcm_s16le"), "wav");
        assert_eq!(codec_extension("vorbis"), "ogg");
        assert_eq!(codec_extension("truehd"), "thd");
        assert_eq!(codec_extension("FLAC"), "flac");
    }

    #[test]
    fn conversion_rules() {
        assert_eq!(choose_conversion("opus", 44100), AudioConversion::Keep);
        assert_eq!(choose_conversion("pcm_s24le", 96000), AudioConversion::Keep);
        assert_eq!(choose_conversion("flac", 48000), AudioConversion::Opus);
        assert_eq!(choose_conversion("flac", 44100), AudioConversion::Wav);
        assert_eq!(choose_conversion("aac", 48000), AudioConversion::Wav);
        assert_eq!(choose_conversion("ac3", 48000), AudioConversion::Wav);
    }

    #[test]
    fn opus_ready_source_is_extracted_and_stretched() {
        let plan = plan_audio_stretch(&StretchTools::default(), &request(Some("opus"), 48000)).unwrap();

        assert_eq!(plan.commands.len(), 2);
        assert_eq!(
            plan.commands[0].display(),
            "ffmpeg -y -i /media/old/Movie.mkv -vn -acodec copy /work/Movie.opus"
        );
        assert_eq!(
            plan.commands[1].display(),
            "rubberband --timemap /media/old/timecodes.txt -t 1.25 /work/Movie.opus \"/media/new/Movie BD.opus\""
        );
        assert_eq!(plan.output, PathBuf::from("/media/new/Movie BD.opus"));
    }

    #[test]
    fn flac_is_transcoded_to_opus() {
        let plan = plan_audio_stretch(&StretchTools::default(), &request(Some("flac"), 48000)).unwrap();

        assert_eq!(plan.commands.len(), 3);
        assert_eq!(
            plan.commands[1].get_args(),
            &[
                "-y",
                "-i",
                "/work/Movie.flac",
                "-ar",
                "48000",
                "-c:a",
                "libopus",
                "-b:a",
                "320k",
                "/work/Movie.converted.opus"
            ]
        );
        assert_eq!(plan.output.extension().unwrap(), "opus");
    }

    #[test]
    fn ac3_decodes_to_wav() {
        let plan = plan_audio_stretch(&StretchTools::default(), &request(Some("ac3"), 44100)).unwrap();
        assert_eq!(plan.commands.len(), 3);
        assert_eq!(
            plan.commands[1].display(),
            "ffmpeg -y -i /work/Movie.ac3 -ar 44100 /work/Movie.converted.wav"
        );
        assert_eq!(plan.output, PathBuf::from("/media/new/Movie BD.wav"));
    }

    #[test]
    fn missing_audio_is_an_error() {
        assert!(matches!(
            plan_audio_stretch(&StretchTools::default(), &request(None, 48000)),
            Err(ExportError::NoAudio)
        ));
    }
}
