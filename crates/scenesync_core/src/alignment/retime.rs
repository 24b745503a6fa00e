//! Dynamic retiming safeguard.
//!
//! A segment whose speed ratio `Δtarget / Δsource` exceeds the policy
//! maximum would force an extreme stretch. Instead, a breakpoint is placed
//! one unit before the segment's end anchor, reached at the last accepted
//! speed; the rest of the segment becomes a jump.

use serde::{Deserialize, Serialize};

use crate::models::Anchor;

/// Default cap on the local speed ratio.
pub const DEFAULT_MAX_SPEED_RATIO: f64 = 1.5;

/// Retiming policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetimingPolicy {
    /// Whether overshooting segments are split at all.
    pub enabled: bool,
    /// Largest accepted `Δtarget / Δsource` ratio.
    pub max_speed_ratio: f64,
}

impl Default for RetimingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_speed_ratio: DEFAULT_MAX_SPEED_RATIO,
        }
    }
}

impl RetimingPolicy {
    /// Policy that leaves anchors untouched.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enabled policy with a custom cap.
    pub fn with_max_ratio(max_speed_ratio: f64) -> Self {
        Self {
            enabled: true,
            max_speed_ratio,
        }
    }
}

/// Insert capping breakpoints into an anchor sequence.
///
/// Walks segments in order, tracking the ratio of the last accepted segment
/// (starting at 1.0). Every segment over the cap that spans more than one
/// unit gets one breakpoint. The one-unit jump after a breakpoint is never
/// split again, and overshooting segments never update the tracked ratio.
pub fn apply_retiming(anchors: &[Anchor], policy: &RetimingPolicy) -> Vec<Anchor> {
    let Some((&first, rest)) = anchors.split_first() else {
        return Vec::new();
    };
    if !policy.enabled {
        return anchors.to_vec();
    }

    let mut out = Vec::with_capacity(anchors.len() + 4);
    out.push(first);
    let mut start = first;
    let mut previous_ratio = 1.0;

    for &next in rest {
        let ratio = start.ratio_to(&next);
        let span = next.source - start.source;

        if ratio > policy.max_speed_ratio {
            if span > 1.0 {
                let source = next.source - 1.0;
                let target = (start.target + (source - start.source) * previous_ratio)
                    .min(next.target);
                let breakpoint = Anchor::new(source, target);

                tracing::debug!(
                    "[Retime] segment {:.0}->{:.0} runs at {:.3}x, capped at {:.3}x with breakpoint ({:.0}, {:.0})",
                    start.source,
                    next.source,
                    ratio,
                    previous_ratio,
                    breakpoint.source,
                    breakpoint.target
                );
                out.push(breakpoint);
            }
        } else {
            previous_ratio = ratio;
        }

        out.push(next);
        start = next;
    }

    out
}
