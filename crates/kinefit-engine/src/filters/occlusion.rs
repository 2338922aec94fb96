//! Occlusion detection and keypoint interpolation.
//!
//! Flags frames whose visible-keypoint ratio falls below the configured
//! level and optionally repairs low-confidence joints from recent history,
//! assigning them a moderate synthetic confidence so downstream consumers
//! can tell repaired joints from observed ones.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kinefit_models::keypoint::{Pose, KEYPOINT_COUNT};

/// Configuration for the occlusion detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcclusionConfig {
    /// Occlusion is flagged when the visible ratio drops below
    /// `1 − occlusion_threshold` (default: 0.3, i.e. below 70% visible)
    pub occlusion_threshold: f64,
    /// Confidence a joint needs to count as visible (default: 0.3)
    pub joint_confidence: f64,
    /// Whether to repair low-confidence joints from history (default: true)
    pub interpolate: bool,
    /// Number of recent frames consulted for interpolation (default: 5)
    pub history_frames: usize,
    /// Confidence assigned to interpolated joints (default: 0.5)
    pub synthetic_confidence: f64,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            occlusion_threshold: 0.3,
            joint_confidence: 0.3,
            interpolate: true,
            history_frames: 5,
            synthetic_confidence: 0.5,
        }
    }
}

/// Outcome of processing one pose.
#[derive(Debug, Clone)]
pub struct OcclusionResult {
    /// Whether the frame is flagged as occluded
    pub occluded: bool,
    /// The pose, with low-confidence joints interpolated when enabled
    pub pose: Pose,
}

/// Detects occlusion and repairs occluded joints from per-joint history.
///
/// One instance belongs to one tracked person; independent tracks need
/// independent instances.
#[derive(Debug, Clone)]
pub struct OcclusionDetector {
    config: OcclusionConfig,
    history: VecDeque<Pose>,
}

impl OcclusionDetector {
    /// Create a detector with the given config.
    pub fn new(config: OcclusionConfig) -> Self {
        let capacity = config.history_frames;
        Self {
            config,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Process one pose: flag occlusion and interpolate repairable joints.
    pub fn process(&mut self, pose: &Pose) -> OcclusionResult {
        let visible = pose.visible_ratio(self.config.joint_confidence);
        let occluded = visible < 1.0 - self.config.occlusion_threshold;
        if occluded {
            debug!(visible, "occlusion flagged");
        }

        let mut repaired = pose.clone();
        if self.config.interpolate {
            for joint in 0..KEYPOINT_COUNT {
                if pose.keypoints[joint].is_confident(self.config.joint_confidence) {
                    continue;
                }
                if let Some((x, y)) = self.historical_mean(joint) {
                    repaired.keypoints[joint].x = x;
                    repaired.keypoints[joint].y = y;
                    repaired.keypoints[joint].confidence = self.config.synthetic_confidence;
                }
            }
        }

        // History keeps raw observations so a repair never feeds on itself
        if self.history.len() == self.config.history_frames {
            self.history.pop_front();
        }
        self.history.push_back(pose.clone());

        OcclusionResult {
            occluded,
            pose: repaired,
        }
    }

    /// Mean coordinate of one joint over the historical frames where it was
    /// confidently observed.
    fn historical_mean(&self, joint: usize) -> Option<(f64, f64)> {
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut count = 0;

        for pose in &self.history {
            let kp = &pose.keypoints[joint];
            if kp.is_confident(self.config.joint_confidence) {
                sum_x += kp.x;
                sum_y += kp.y;
                count += 1;
            }
        }

        (count > 0).then(|| (sum_x / count as f64, sum_y / count as f64))
    }

    /// Clear history. Called on session end or template change.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinefit_models::keypoint::Keypoint;

    fn pose_with_confidence(confidence: f64) -> Pose {
        Pose::new([Keypoint::new(50.0, 80.0, confidence); KEYPOINT_COUNT])
    }

    #[test]
    fn test_fully_visible_not_flagged() {
        let mut detector = OcclusionDetector::new(OcclusionConfig::default());
        let result = detector.process(&pose_with_confidence(0.9));
        assert!(!result.occluded);
    }

    #[test]
    fn test_mostly_hidden_flagged() {
        let mut detector = OcclusionDetector::new(OcclusionConfig::default());
        let mut pose = pose_with_confidence(0.9);
        // Hide 9 of 17 joints: visible ratio 8/17 < 0.7
        for joint in 0..9 {
            pose.keypoints[joint].confidence = 0.1;
        }
        let result = detector.process(&pose);
        assert!(result.occluded);
    }

    #[test]
    fn test_interpolation_uses_historical_mean() {
        let mut detector = OcclusionDetector::new(OcclusionConfig::default());

        let mut a = pose_with_confidence(0.9);
        a.keypoints[10] = Keypoint::new(100.0, 200.0, 0.9);
        detector.process(&a);

        let mut b = pose_with_confidence(0.9);
        b.keypoints[10] = Keypoint::new(110.0, 220.0, 0.9);
        detector.process(&b);

        let mut occluded = pose_with_confidence(0.9);
        occluded.keypoints[10] = Keypoint::new(0.0, 0.0, 0.05);
        let result = detector.process(&occluded);

        let repaired = &result.pose.keypoints[10];
        assert!((repaired.x - 105.0).abs() < 1e-9);
        assert!((repaired.y - 210.0).abs() < 1e-9);
        assert_eq!(repaired.confidence, 0.5);
    }

    #[test]
    fn test_no_history_leaves_joint_untouched() {
        let mut detector = OcclusionDetector::new(OcclusionConfig::default());
        let mut pose = pose_with_confidence(0.9);
        pose.keypoints[3] = Keypoint::new(7.0, 9.0, 0.05);
        let result = detector.process(&pose);
        // Nothing to interpolate from on the first frame
        assert_eq!(result.pose.keypoints[3].x, 7.0);
        assert_eq!(result.pose.keypoints[3].confidence, 0.05);
    }

    #[test]
    fn test_interpolation_disabled() {
        let config = OcclusionConfig {
            interpolate: false,
            ..Default::default()
        };
        let mut detector = OcclusionDetector::new(config);
        detector.process(&pose_with_confidence(0.9));

        let mut pose = pose_with_confidence(0.9);
        pose.keypoints[4].confidence = 0.05;
        let result = detector.process(&pose);
        assert_eq!(result.pose.keypoints[4].confidence, 0.05);
    }
}
