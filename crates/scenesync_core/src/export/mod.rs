//! Curve consumers and session artifacts.
//!
//! - `timemap`: rubberband time map from an audio-sample curve
//! - `stretch`: ffmpeg/rubberband command plan for the audio track
//! - `preview`: HTML page for curating correspondences

mod error;
mod preview;
mod stretch;
mod timemap;

pub use error::{ExportError, ExportResult};
pub use preview::{format_clock, preview_rows, render_preview, write_preview, PreviewRow};
pub use stretch::{
    choose_conversion, codec_extension, plan_audio_stretch, AudioConversion, StretchPlan,
    StretchRequest, StretchTools,
};
pub use timemap::{format_time_map, write_time_map, TIME_MAP_FILE};
