//! Curation preview.
//!
//! A static HTML page listing every candidate correspondence with both
//! stills side by side, so the user can spot bad matches before the curve
//! is built. Write-only; never parsed back.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ExportError, ExportResult};
use crate::models::{Anchor, CorrespondencePair, CurveUnit, FingerprintSet};

/// One row of the preview page.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    /// Index the user refers to when asking for removal.
    pub index: usize,
    pub source_image: Option<PathBuf>,
    pub target_image: Option<PathBuf>,
    pub source_frame: u64,
    pub target_frame: u64,
    /// Anchor in curve units.
    pub anchor: Anchor,
    pub source_seconds: f64,
    pub target_seconds: f64,
    pub distance: u32,
}

/// Build preview rows from source-oriented pairs and their anchors.
///
/// `anchors` must line up with `pairs`. Pairs whose scenes cannot be found
/// are skipped.
pub fn preview_rows(
    pairs: &[CorrespondencePair],
    anchors: &[Anchor],
    source: &FingerprintSet,
    target: &FingerprintSet,
) -> Vec<PreviewRow> {
    pairs
        .iter()
        .zip(anchors.iter())
        .enumerate()
        .filter_map(|(index, (pair, anchor))| {
            let source_fp = source.get(pair.main_index)?;
            let target_fp = target.get(pair.twin_index?)?;
            Some(PreviewRow {
                index,
                source_image: source_fp.image_path.clone(),
                target_image: target_fp.image_path.clone(),
                source_frame: source_fp.global_frame_index,
                target_frame: target_fp.global_frame_index,
                anchor: *anchor,
                source_seconds: source_fp.pts_seconds,
                target_seconds: target_fp.pts_seconds,
                distance: pair.distance,
            })
        })
        .collect()
}

/// Format seconds as `HH:MM:SS`.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn image_cell(image: &Option<PathBuf>) -> String {
    match image {
        Some(path) => format!(
            "<img src=\"{}\" width=\"480\">",
            escape(&path.to_string_lossy())
        ),
        None => "<em>no image</em>".to_string(),
    }
}

/// Render the preview page.
pub fn render_preview(rows: &[PreviewRow], unit: CurveUnit) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Scene Sync - associations</title>\n");
    html.push_str(
        "<style>body{font-family:sans-serif;background:#222;color:#ddd}\
         .pair{margin:1em 0;padding:.5em;border-bottom:1px solid #555}\
         .stills{display:flex;gap:1em}</style>\n",
    );
    html.push_str("</head>\n<body>\n");

    for row in rows {
        html.push_str(&format!(
            "<div class=\"pair\">\n<h3>Association index {}</h3>\n\
             <div class=\"stills\">{}{}</div>\n\
             <p>source frame {} at {} ({:.0} {unit}) &rarr; target frame {} at {} ({:.0} {unit}), distance {}</p>\n</div>\n",
            row.index,
            image_cell(&row.source_image),
            image_cell(&row.target_image),
            row.source_frame,
            format_clock(row.source_seconds),
            row.anchor.source,
            row.target_frame,
            format_clock(row.target_seconds),
            row.anchor.target,
            row.distance,
            unit = unit.label(),
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Write the preview page to `path`.
pub fn write_preview(path: &Path, rows: &[PreviewRow], unit: CurveUnit) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ExportError::write(parent, e))?;
    }
    fs::write(path, render_preview(rows, unit)).map_err(|e| ExportError::write(path, e))?;
    tracing::info!("[Preview] {} associations written to {}", rows.len(), path.display());
    Ok(())
}
