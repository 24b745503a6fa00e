//! Timing curve anchors and lookups.
//!
//! A `TimingCurve` maps a position on the source timeline to the matching
//! position on the target timeline. Both coordinates share one unit: either
//! milliseconds (subtitles) or source audio samples (audio).
//!
//! All arithmetic stays in `f64`; values are rounded only when exported.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A control point of the timing curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Position on the source timeline.
    pub source: f64,
    /// Corresponding position on the target timeline.
    pub target: f64,
}

impl Anchor {
    pub fn new(source: f64, target: f64) -> Self {
        Self { source, target }
    }

    /// Local speed ratio `Δtarget / Δsource` of the segment ending at `next`.
    pub fn ratio_to(&self, next: &Anchor) -> f64 {
        (next.target - self.target) / (next.source - self.source)
    }
}

/// Unit shared by both curve coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveUnit {
    /// Milliseconds.
    Milliseconds,
    /// Audio sample index at the source track's sample rate.
    AudioSamples { sample_rate: u32 },
}

impl CurveUnit {
    /// Number of curve units per second of media.
    pub fn units_per_second(&self) -> f64 {
        match self {
            CurveUnit::Milliseconds => 1000.0,
            CurveUnit::AudioSamples { sample_rate } => f64::from(*sample_rate),
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            CurveUnit::Milliseconds => "ms",
            CurveUnit::AudioSamples { .. } => "samples",
        }
    }
}

/// Ordering violations found by `TimingCurve::validate`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveViolation {
    #[error("curve needs at least two anchors, found {0}")]
    TooFewAnchors(usize),

    #[error("source must increase strictly: anchor {index} has {current} after {previous}")]
    SourceNotIncreasing {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("target must not decrease: anchor {index} has {current} after {previous}")]
    TargetDecreasing {
        index: usize,
        previous: f64,
        current: f64,
    },
}

/// Piecewise-linear map from source time to target time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingCurve {
    unit: CurveUnit,
    anchors: Vec<Anchor>,
}

impl TimingCurve {
    /// Wrap anchors without checking them. Call `validate` before use.
    pub fn new(unit: CurveUnit, anchors: Vec<Anchor>) -> Self {
        Self { unit, anchors }
    }

    pub fn unit(&self) -> CurveUnit {
        self.unit
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Check the curve invariants: at least two anchors, source strictly
    /// increasing, target non-decreasing.
    pub fn validate(&self) -> Result<(), CurveViolation> {
        if self.anchors.len() < 2 {
            return Err(CurveViolation::TooFewAnchors(self.anchors.len()));
        }

        for (i, pair) in self.anchors.windows(2).enumerate() {
            let (prev, cur) = (pair[0], pair[1]);
            if !(cur.source > prev.source) {
                return Err(CurveViolation::SourceNotIncreasing {
                    index: i + 1,
                    previous: prev.source,
                    current: cur.source,
                });
            }
            if cur.target < prev.target {
                return Err(CurveViolation::TargetDecreasing {
                    index: i + 1,
                    previous: prev.target,
                    current: cur.target,
                });
            }
        }

        Ok(())
    }

    /// Source range covered by the curve.
    pub fn coverage(&self) -> Option<(f64, f64)> {
        match (self.anchors.first(), self.anchors.last()) {
            (Some(first), Some(last)) => Some((first.source, last.source)),
            _ => None,
        }
    }

    /// Map a source position onto the target timeline.
    ///
    /// Finds the anchors with `lower.source <= t < upper.source` and
    /// interpolates linearly. The final anchor maps to its own target.
    /// Returns `None` outside the covered range.
    pub fn interpolate(&self, t: f64) -> Option<f64> {
        for pair in self.anchors.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            if lower.source <= t && t < upper.source {
                let frac = (t - lower.source) / (upper.source - lower.source);
                return Some(lower.target + frac * (upper.target - lower.target));
            }
        }

        match self.anchors.last() {
            Some(last) if last.source == t => Some(last.target),
            _ => None,
        }
    }

    /// Like `interpolate`, but leaves positions outside the curve unchanged.
    pub fn remap(&self, t: f64) -> f64 {
        self.interpolate(t).unwrap_or(t)
    }

    /// Per-segment speed ratios, in order.
    pub fn segment_ratios(&self) -> Vec<f64> {
        self.anchors
            .windows(2)
            .map(|pair| pair[0].ratio_to(&pair[1]))
            .collect()
    }
}
