//! Ghost-detection rejection and overlap suppression.
//!
//! Ghosts are detector hallucinations: too few confident joints, a torso
//! outside the absolute pixel band, or wildly asymmetric arm lengths.
//! Survivors are additionally de-duplicated — of any pair with high bbox
//! IoU, only the higher-scoring detection is kept.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kinefit_models::{DetectionCandidate, Side};

use crate::skeleton;

/// Configuration for the ghost-detection filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostFilterConfig {
    /// Minimum number of sufficiently confident joints (default: 5)
    pub min_confident_joints: usize,
    /// Confidence level a joint must reach to count (default: 0.3)
    pub joint_confidence: f64,
    /// Lower edge of the absolute torso length band in pixels (default: 40.0)
    pub min_torso_px: f64,
    /// Upper edge of the absolute torso length band in pixels (default: 400.0)
    pub max_torso_px: f64,
    /// Maximum longer/shorter arm length ratio (default: 2.0)
    pub max_arm_asymmetry: f64,
    /// Bbox IoU above which two survivors are duplicates (default: 0.5)
    pub iou_threshold: f64,
}

impl Default for GhostFilterConfig {
    fn default() -> Self {
        Self {
            min_confident_joints: 5,
            joint_confidence: 0.3,
            min_torso_px: 40.0,
            max_torso_px: 400.0,
            max_arm_asymmetry: 2.0,
            iou_threshold: 0.5,
        }
    }
}

/// Rejects hallucinated detections and suppresses overlapping duplicates.
#[derive(Debug, Clone)]
pub struct GhostDetectionFilter {
    config: GhostFilterConfig,
}

impl GhostDetectionFilter {
    /// Create a filter with the given config.
    pub fn new(config: GhostFilterConfig) -> Self {
        Self { config }
    }

    /// Whether a single candidate passes the ghost checks.
    ///
    /// The confident-joint floor applies unconditionally: a detection below
    /// it is rejected no matter what the other checks would say.
    pub fn accept(&self, candidate: &DetectionCandidate) -> bool {
        let pose = &candidate.pose;
        let min_conf = self.config.joint_confidence;

        let confident = pose.confident_count(min_conf);
        if confident < self.config.min_confident_joints {
            debug!(confident, "too few confident joints");
            return false;
        }

        if let Some(torso) = skeleton::torso_length(pose, min_conf) {
            if torso < self.config.min_torso_px || torso > self.config.max_torso_px {
                debug!(torso, "torso length outside absolute band");
                return false;
            }
        }

        if let (Some(left), Some(right)) = (
            skeleton::arm_length(pose, Side::Left, min_conf),
            skeleton::arm_length(pose, Side::Right, min_conf),
        ) {
            let (longer, shorter) = if left >= right { (left, right) } else { (right, left) };
            if shorter > 0.0 && longer / shorter > self.config.max_arm_asymmetry {
                debug!(left, right, "arm length asymmetry beyond bound");
                return false;
            }
        }

        true
    }

    /// Suppress overlapping survivors: among any pair with bbox IoU above
    /// the threshold, keep only the higher-scoring detection.
    pub fn suppress_overlaps(&self, mut survivors: Vec<DetectionCandidate>) -> Vec<DetectionCandidate> {
        survivors.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut kept: Vec<DetectionCandidate> = Vec::with_capacity(survivors.len());
        for candidate in survivors {
            let duplicate = kept
                .iter()
                .any(|k| k.bbox.iou(&candidate.bbox) > self.config.iou_threshold);
            if duplicate {
                debug!(score = candidate.score, "suppressing overlapping detection");
            } else {
                kept.push(candidate);
            }
        }
        kept
    }
}
