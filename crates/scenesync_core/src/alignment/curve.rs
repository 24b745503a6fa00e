//! Timecode curve builder.
//!
//! Turns curated correspondence pairs into a `TimingCurve`:
//!
//! 1. re-insert the safe start/end if curation removed them
//! 2. convert pairs to anchors in the consumer's unit
//! 3. extend the tail to the end of the source at the final segment's speed
//! 4. prepend a pre-roll anchor at unit speed
//! 5. apply the retiming safeguard
//!
//! For the audio unit both coordinates live in source sample space: the
//! target frame is converted to a source-fps frame count and then to source
//! samples, so downstream lookups are a single linear fit.

use super::error::{AlignError, AlignResult};
use super::retime::{apply_retiming, RetimingPolicy};
use super::safe_frames::reinsert_safe_bounds;
use crate::models::{
    Anchor, CorrespondencePair, CurveUnit, Fingerprint, FingerprintSet, SafeFrames, TimingCurve,
};

/// Inputs for `build_curve`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveParams {
    /// Unit of the resulting curve.
    pub unit: CurveUnit,
    /// Source video frame rate.
    pub source_fps: f64,
    /// Target video frame rate.
    pub target_fps: f64,
    /// Source media duration in seconds.
    pub source_duration_secs: f64,
    /// User-confirmed safe frames.
    pub safe_frames: SafeFrames,
    /// Retiming safeguard policy.
    pub retiming: RetimingPolicy,
}

impl CurveParams {
    /// Last position on the source timeline, in curve units.
    fn source_end(&self) -> f64 {
        self.source_duration_secs * self.unit.units_per_second() - 1.0
    }
}

/// Convert one source/target fingerprint pair into an anchor.
pub fn fingerprint_anchor(
    source: &Fingerprint,
    target: &Fingerprint,
    unit: CurveUnit,
    source_fps: f64,
    target_fps: f64,
) -> Anchor {
    match unit {
        CurveUnit::Milliseconds => Anchor::new(source.pts_millis, target.pts_millis),
        CurveUnit::AudioSamples { sample_rate } => {
            let rate = f64::from(sample_rate);
            let samples_per_frame = rate / source_fps;
            let source_frames = source.pts_seconds * source_fps;
            let target_in_source_frames = target.global_frame_index as f64 / target_fps * source_fps;
            Anchor::new(
                samples_per_frame * source_frames,
                samples_per_frame * target_in_source_frames,
            )
        }
    }
}

/// Convert oriented pairs (`main` = source scene) into anchors.
pub fn pairs_to_anchors(
    pairs: &[CorrespondencePair],
    source: &FingerprintSet,
    target: &FingerprintSet,
    params: &CurveParams,
) -> AlignResult<Vec<Anchor>> {
    pairs
        .iter()
        .map(|pair| {
            let source_fp = source.get(pair.main_index).ok_or(AlignError::UnknownScene {
                side: "source",
                index: pair.main_index,
            })?;
            let twin = pair.twin_index.ok_or(AlignError::UnmatchedPair {
                main_index: pair.main_index,
            })?;
            let target_fp = target.get(twin).ok_or(AlignError::UnknownScene {
                side: "target",
                index: twin,
            })?;
            Ok(fingerprint_anchor(
                source_fp,
                target_fp,
                params.unit,
                params.source_fps,
                params.target_fps,
            ))
        })
        .collect()
}

/// Prepend an anchor before the first one that keeps unit speed.
///
/// The pre-roll anchor sits at `(first.source - first.target, 0)`. When that
/// would be negative it is mirrored to `(0, first.target - first.source)`.
/// Skipped when it would not come strictly before `first`.
pub fn extend_start(anchors: &mut Vec<Anchor>) {
    let Some(&first) = anchors.first() else {
        return;
    };

    let offset = first.source - first.target;
    let pre_roll = if offset >= 0.0 {
        Anchor::new(offset, 0.0)
    } else {
        Anchor::new(0.0, -offset)
    };

    if pre_roll.source < first.source {
        anchors.insert(0, pre_roll);
    }
}

/// Append an anchor at `source_end` using the speed of the last segment.
///
/// Skipped when fewer than two anchors exist or `source_end` is not after
/// the last anchor.
pub fn extend_end(anchors: &mut Vec<Anchor>, source_end: f64) {
    let n = anchors.len();
    if n < 2 {
        return;
    }
    let (before, last) = (anchors[n - 2], anchors[n - 1]);
    if source_end <= last.source {
        return;
    }

    let speed = before.ratio_to(&last);
    anchors.push(Anchor::new(
        source_end,
        last.target + (source_end - last.source) * speed,
    ));
}

/// Build the timing curve from curated, source-oriented pairs.
pub fn build_curve(
    pairs: &[CorrespondencePair],
    source: &FingerprintSet,
    target: &FingerprintSet,
    params: &CurveParams,
) -> AlignResult<TimingCurve> {
    let pairs = reinsert_safe_bounds(pairs, &params.safe_frames);
    if pairs.len() < 2 {
        return Err(AlignError::InsufficientAnchors { found: pairs.len() });
    }

    let mut anchors = pairs_to_anchors(&pairs, source, target, params)?;
    TimingCurve::new(params.unit, anchors.clone()).validate()?;

    extend_end(&mut anchors, params.source_end());
    extend_start(&mut anchors);
    let anchors = apply_retiming(&anchors, &params.retiming);

    let curve = TimingCurve::new(params.unit, anchors);
    curve.validate()?;

    tracing::info!(
        "[Curve] {} anchors from {} pairs ({})",
        curve.len(),
        pairs.len(),
        params.unit.label()
    );

    Ok(curve)
}
