//! Movement-speed analysis from ankle displacement.

use kinefit_models::keypoint::{KeypointIndex, Pose};

use super::window::PoseWindow;
use super::AnalyzerConfig;

/// Speed verdict against the absolute floor and ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedVerdict {
    /// Window-average speed under the floor
    BelowFloor,
    /// Window-maximum speed over the ceiling
    AboveCeiling,
}

/// Window speed profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedAssessment {
    /// Mean per-frame ankle speed in pixels per second
    pub average: f64,
    /// Maximum per-frame ankle speed in pixels per second
    pub peak: f64,
    /// Violation, if any; ceiling violations take precedence
    pub verdict: Option<SpeedVerdict>,
}

/// Assess movement speed over the window. `None` until the window has its
/// minimum fill or when no consecutive frame pair is measurable.
pub(super) fn assess(window: &PoseWindow, config: &AnalyzerConfig) -> Option<SpeedAssessment> {
    if !window.has_min_duration(config.min_window_seconds) {
        return None;
    }

    let frames: Vec<_> = window.iter().collect();
    let mut speeds = Vec::with_capacity(frames.len().saturating_sub(1));

    for pair in frames.windows(2) {
        let dt = pair[1].timestamp - pair[0].timestamp;
        if dt <= 0.0 {
            continue;
        }
        if let Some(displacement) =
            ankle_displacement(&pair[0].pose, &pair[1].pose, config.min_joint_confidence)
        {
            speeds.push(displacement / dt);
        }
    }

    if speeds.is_empty() {
        return None;
    }

    let average = speeds.iter().sum::<f64>() / speeds.len() as f64;
    let peak = speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let verdict = if peak > config.speed_ceiling {
        Some(SpeedVerdict::AboveCeiling)
    } else if average < config.speed_floor {
        Some(SpeedVerdict::BelowFloor)
    } else {
        None
    };

    Some(SpeedAssessment {
        average,
        peak,
        verdict,
    })
}

/// Mean displacement of the ankles between two poses, over the sides
/// confidently detected in both.
fn ankle_displacement(a: &Pose, b: &Pose, min_conf: f64) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0;

    for ankle in [KeypointIndex::LeftAnkle, KeypointIndex::RightAnkle] {
        let ka = a.get(ankle);
        let kb = b.get(ankle);
        if ka.is_confident(min_conf) && kb.is_confident(min_conf) {
            sum += ka.distance_to(kb);
            count += 1;
        }
    }

    (count > 0).then(|| sum / count as f64)
}
