//! Movement-amplitude analysis: leg lift and arm swing.

use kinefit_models::keypoint::{KeypointIndex, Pose};
use kinefit_models::GoldenTemplate;

use super::window::PoseWindow;
use super::{AnalyzerConfig, BandVerdict, METRIC_ARM_SWING, METRIC_LEG_LIFT};
use crate::stats;

/// One amplitude observation against its reference band.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCheck {
    /// Window maximum of the per-frame amplitude
    pub observed: f64,
    pub verdict: BandVerdict,
}

/// Window amplitudes with their reference verdicts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistanceAssessment {
    /// Leg-lift height check, when measurable and referenced
    pub leg_lift: Option<RangeCheck>,
    /// Arm-swing height check, when measurable and referenced
    pub arm_swing: Option<RangeCheck>,
}

/// Assess movement amplitudes over the window. `None` until the window has
/// its minimum fill.
pub(super) fn assess(
    window: &PoseWindow,
    template: &GoldenTemplate,
    config: &AnalyzerConfig,
) -> Option<DistanceAssessment> {
    if !window.has_min_duration(config.min_window_seconds) {
        return None;
    }

    let min_conf = config.min_joint_confidence;

    let leg_lifts: Vec<f64> = window
        .iter()
        .filter_map(|frame| leg_lift_height(&frame.pose, min_conf))
        .collect();
    let arm_swings: Vec<f64> = window
        .iter()
        .filter_map(|frame| arm_swing_height(&frame.pose, min_conf))
        .collect();

    Some(DistanceAssessment {
        leg_lift: check(METRIC_LEG_LIFT, &leg_lifts, template, config),
        arm_swing: check(METRIC_ARM_SWING, &arm_swings, template, config),
    })
}

/// Compare a window maximum against the metric's reference band. The
/// side-averaged statistic stands in when no combined one exists.
fn check(
    metric: &str,
    samples: &[f64],
    template: &GoldenTemplate,
    config: &AnalyzerConfig,
) -> Option<RangeCheck> {
    let observed = stats::finite_max(samples)?;
    let stat = template.stats(metric)?.resolved()?;
    let std = stat.usable_std()?;

    let verdict = if observed < stat.mean - config.sigma_band * std {
        BandVerdict::Below
    } else if observed > stat.mean + config.sigma_band * std {
        BandVerdict::Above
    } else {
        BandVerdict::Within
    };

    Some(RangeCheck { observed, verdict })
}

/// Per-frame leg lift: vertical offset between the two ankles. Raising one
/// foot while the other stands grows this directly.
fn leg_lift_height(pose: &Pose, min_conf: f64) -> Option<f64> {
    let left = pose.get(KeypointIndex::LeftAnkle);
    let right = pose.get(KeypointIndex::RightAnkle);
    (left.is_confident(min_conf) && right.is_confident(min_conf))
        .then(|| (left.y - right.y).abs())
}

/// Per-frame arm swing: highest wrist elevation above its hip, across the
/// sides that are measurable.
fn arm_swing_height(pose: &Pose, min_conf: f64) -> Option<f64> {
    let mut best: Option<f64> = None;

    for (hip, wrist) in [
        (KeypointIndex::LeftHip, KeypointIndex::LeftWrist),
        (KeypointIndex::RightHip, KeypointIndex::RightWrist),
    ] {
        let h = pose.get(hip);
        let w = pose.get(wrist);
        if h.is_confident(min_conf) && w.is_confident(min_conf) {
            // Image y grows downward: a raised wrist sits above the hip
            let height = (h.y - w.y).max(0.0);
            best = Some(best.map_or(height, |b: f64| b.max(height)));
        }
    }

    best
}
