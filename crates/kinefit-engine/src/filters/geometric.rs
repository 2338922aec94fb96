//! Keypoint geometric consistency checks.
//!
//! Validates that the detected skeleton has human proportions: torso/leg
//! ratio inside a band, head placed sanely relative to the shoulder line,
//! and left/right joints at roughly symmetric heights. Checks whose inputs
//! are not measurable on a given pose are skipped rather than failed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kinefit_models::DetectionCandidate;

use crate::skeleton;

/// Configuration for the geometric consistency filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometricFilterConfig {
    /// Minimum keypoint confidence for a joint to enter a measurement
    /// (default: 0.3)
    pub min_keypoint_confidence: f64,
    /// Lower edge of the torso/leg length ratio band (default: 0.4)
    pub min_torso_leg_ratio: f64,
    /// Upper edge of the torso/leg length ratio band (default: 1.1)
    pub max_torso_leg_ratio: f64,
    /// Maximum magnitude of the height-normalized head offset from the
    /// shoulder line (default: 0.35)
    pub max_head_offset_ratio: f64,
    /// Minimum six-pair left/right symmetry score (default: 0.5)
    pub min_symmetry_score: f64,
}

impl Default for GeometricFilterConfig {
    fn default() -> Self {
        Self {
            min_keypoint_confidence: 0.3,
            min_torso_leg_ratio: 0.4,
            max_torso_leg_ratio: 1.1,
            max_head_offset_ratio: 0.35,
            min_symmetry_score: 0.5,
        }
    }
}

/// Rejects detections whose skeleton proportions are not human-plausible.
#[derive(Debug, Clone)]
pub struct GeometricConsistencyFilter {
    config: GeometricFilterConfig,
}

impl GeometricConsistencyFilter {
    /// Create a filter with the given config.
    pub fn new(config: GeometricFilterConfig) -> Self {
        Self { config }
    }

    /// Whether the candidate's skeleton passes the proportion checks.
    pub fn accept(&self, candidate: &DetectionCandidate) -> bool {
        let pose = &candidate.pose;
        let min_conf = self.config.min_keypoint_confidence;

        if let (Some(torso), Some(leg)) = (
            skeleton::torso_length(pose, min_conf),
            skeleton::leg_length(pose, min_conf),
        ) {
            if leg > 0.0 {
                let ratio = torso / leg;
                if ratio < self.config.min_torso_leg_ratio
                    || ratio > self.config.max_torso_leg_ratio
                {
                    debug!(ratio, "torso/leg ratio outside band");
                    return false;
                }
            }
        }

        if let Some(offset) = skeleton::head_offset_ratio(pose, min_conf) {
            if offset.abs() > self.config.max_head_offset_ratio {
                debug!(offset, "head offset from shoulder line out of bound");
                return false;
            }
        }

        if let Some(score) = skeleton::symmetry_score(pose, min_conf) {
            if score < self.config.min_symmetry_score {
                debug!(score, "left/right symmetry below minimum");
                return false;
            }
        }

        true
    }
}
