//! Cadence analysis from foot-lift peaks.

use kinefit_models::keypoint::KeypointIndex;
use kinefit_models::GoldenTemplate;

use super::window::PoseWindow;
use super::{AnalyzerConfig, BandVerdict, METRIC_CADENCE};

/// Cadence over the window with its reference verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmAssessment {
    /// Foot-lift events per minute
    pub cadence: f64,
    /// Number of detected peaks across both feet
    pub peak_count: usize,
    /// Verdict against the reference band, when the template provides a
    /// cadence statistic
    pub verdict: Option<BandVerdict>,
}

/// Assess cadence over the window. `None` until the window has its minimum
/// fill.
pub(super) fn assess(
    window: &PoseWindow,
    template: &GoldenTemplate,
    config: &AnalyzerConfig,
) -> Option<RhythmAssessment> {
    if !window.has_min_duration(config.min_window_seconds) {
        return None;
    }
    let duration = window.duration();
    if duration <= 0.0 {
        return None;
    }

    let mut peak_count = 0;
    for ankle in [KeypointIndex::LeftAnkle, KeypointIndex::RightAnkle] {
        // Elevation rises as the foot lifts; image y grows downward
        let elevation: Vec<f64> = window
            .iter()
            .map(|frame| {
                let kp = frame.pose.get(ankle);
                if kp.is_confident(config.min_joint_confidence) {
                    -kp.y
                } else {
                    f64::NAN
                }
            })
            .collect();
        peak_count += count_peaks(&elevation, config.min_peak_separation);
    }

    let cadence = peak_count as f64 / duration * 60.0;

    let verdict = template
        .stats(METRIC_CADENCE)
        .and_then(|stats| stats.resolved())
        .and_then(|stat| {
            let std = stat.usable_std()?;
            Some(if cadence < stat.mean - config.sigma_band * std {
                BandVerdict::Below
            } else if cadence > stat.mean + config.sigma_band * std {
                BandVerdict::Above
            } else {
                BandVerdict::Within
            })
        });

    Some(RhythmAssessment {
        cadence,
        peak_count,
        verdict,
    })
}

/// Count local maxima with a minimum index separation. NaN samples (low
/// confidence) break peak eligibility without aborting the series.
fn count_peaks(series: &[f64], min_separation: usize) -> usize {
    let mut count = 0;
    let mut last_peak: Option<usize> = None;

    for i in 1..series.len().saturating_sub(1) {
        let (prev, cur, next) = (series[i - 1], series[i], series[i + 1]);
        if !prev.is_finite() || !cur.is_finite() || !next.is_finite() {
            continue;
        }
        if cur > prev && cur >= next {
            let separated = last_peak
                .map(|p| i - p >= min_separation)
                .unwrap_or(true);
            if separated {
                count += 1;
                last_peak = Some(i);
            }
        }
    }
    count
}
