//! Audio time-map exporter.
//!
//! Writes one `<sourceSample> <targetSample>` line per anchor, ascending by
//! source sample, as read by rubberband's `--timemap` option. Values are
//! rounded to whole samples here and nowhere earlier.

use std::fs;
use std::path::Path;

use super::error::{ExportError, ExportResult};
use crate::models::{CurveUnit, TimingCurve};

/// Default file name of the time map.
pub const TIME_MAP_FILE: &str = "timecodes.txt";

/// Render a sample-unit curve as time-map text.
pub fn format_time_map(curve: &TimingCurve) -> ExportResult<String> {
    let unit = curve.unit();
    if !matches!(unit, CurveUnit::AudioSamples { .. }) {
        return Err(ExportError::WrongUnit(unit.label()));
    }
    curve.validate()?;

    let mut out = String::new();
    let mut previous: Option<i64> = None;

    for (line, anchor) in curve.anchors().iter().enumerate() {
        let source = anchor.source.round() as i64;
        let target = anchor.target.round() as i64;

        if let Some(prev) = previous {
            if source <= prev {
                return Err(ExportError::RoundingCollision {
                    line: line - 1,
                    value: source,
                });
            }
        }
        previous = Some(source);

        out.push_str(&format!("{} {}\n", source, target));
    }

    Ok(out)
}

/// Write the time map to `path` as UTF-8.
pub fn write_time_map(curve: &TimingCurve, path: &Path) -> ExportResult<()> {
    let content = format_time_map(curve)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ExportError::write(parent, e))?;
    }
    fs::write(path, content).map_err(|e| ExportError::write(path, e))?;

    tracing::info!(
        "[TimeMap] wrote {} anchors to {}",
        curve.len(),
        path.display()
    );
    Ok(())
}
