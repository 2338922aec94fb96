//! Detection reliability filtering.
//!
//! [`FilterPipeline`] applies the filters in their mandated order:
//! spatial consistency → keypoint geometric consistency → ghost rejection
//! (including overlap suppression) → velocity-based track filtering →
//! occlusion detection. A detection rejected by an early stage never
//! reaches the later ones.

pub mod geometric;
pub mod ghost;
pub mod occlusion;
pub mod spatial;
pub mod velocity;

pub use geometric::{GeometricConsistencyFilter, GeometricFilterConfig};
pub use ghost::{GhostDetectionFilter, GhostFilterConfig};
pub use occlusion::{OcclusionConfig, OcclusionDetector, OcclusionResult};
pub use spatial::{SpatialConsistencyFilter, SpatialFilterConfig};
pub use velocity::{VelocityFilterConfig, VelocityTrackFilter};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kinefit_models::DetectionCandidate;

/// Configuration for the full reliability pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterPipelineConfig {
    pub spatial: SpatialFilterConfig,
    pub geometric: GeometricFilterConfig,
    pub ghost: GhostFilterConfig,
    pub velocity: VelocityFilterConfig,
    pub occlusion: OcclusionConfig,
}

/// A detection that survived filtering, with its occlusion flag.
#[derive(Debug, Clone)]
pub struct FilteredDetection {
    pub candidate: DetectionCandidate,
    pub occluded: bool,
}

/// Per-stage rejection counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub frames: u64,
    pub candidates_in: u64,
    pub rejected_spatial: u64,
    pub rejected_geometric: u64,
    pub rejected_ghost: u64,
    pub suppressed_overlap: u64,
    pub rejected_velocity: u64,
    pub occluded_frames: u64,
}

/// Reliability filter chain for one evaluation context.
///
/// Owns all mutable filter state (track arena, occlusion histories);
/// concurrent contexts must construct independent pipelines.
pub struct FilterPipeline {
    spatial: SpatialConsistencyFilter,
    geometric: GeometricConsistencyFilter,
    ghost: GhostDetectionFilter,
    velocity: VelocityTrackFilter,
    occlusion_config: OcclusionConfig,
    evict_after_frames: u64,
    /// Occlusion history per tracked person, with its last-seen frame
    occlusion_states: HashMap<u32, (OcclusionDetector, u64)>,
    stats: FilterStats,
}

impl FilterPipeline {
    /// Create a pipeline with the given config.
    pub fn new(config: FilterPipelineConfig) -> Self {
        Self {
            spatial: SpatialConsistencyFilter::new(config.spatial),
            geometric: GeometricConsistencyFilter::new(config.geometric),
            ghost: GhostDetectionFilter::new(config.ghost),
            evict_after_frames: config.velocity.evict_after_frames,
            velocity: VelocityTrackFilter::new(config.velocity),
            occlusion_config: config.occlusion,
            occlusion_states: HashMap::new(),
            stats: FilterStats::default(),
        }
    }

    /// Filter one frame's detection candidates.
    ///
    /// Returns the reliable subset in score order, each with its occlusion
    /// flag and (for tracked candidates) interpolated joints.
    pub fn process_frame(
        &mut self,
        frame_index: u64,
        frame_width: u32,
        frame_height: u32,
        candidates: Vec<DetectionCandidate>,
    ) -> Vec<FilteredDetection> {
        self.stats.frames += 1;
        self.stats.candidates_in += candidates.len() as u64;

        let mut survivors = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !self.spatial.accept(&candidate, frame_width, frame_height) {
                self.stats.rejected_spatial += 1;
                continue;
            }
            if !self.geometric.accept(&candidate) {
                self.stats.rejected_geometric += 1;
                continue;
            }
            if !self.ghost.accept(&candidate) {
                self.stats.rejected_ghost += 1;
                continue;
            }
            survivors.push(candidate);
        }

        let before = survivors.len();
        let survivors = self.ghost.suppress_overlaps(survivors);
        self.stats.suppressed_overlap += (before - survivors.len()) as u64;

        let mut out = Vec::with_capacity(survivors.len());
        for candidate in survivors {
            if !self.velocity.accept(&candidate, frame_index) {
                self.stats.rejected_velocity += 1;
                continue;
            }
            out.push(self.apply_occlusion(candidate, frame_index));
        }

        self.velocity.prune(frame_index);
        let horizon = self.evict_after_frames;
        self.occlusion_states
            .retain(|_, (_, last_seen)| frame_index.saturating_sub(*last_seen) <= horizon);

        if out.iter().any(|d| d.occluded) {
            self.stats.occluded_frames += 1;
        }

        debug!(
            frame_index,
            kept = out.len(),
            "frame filtered"
        );
        out
    }

    /// Occlusion detection: stateful per track, flag-only for untracked
    /// candidates (no history to interpolate from).
    fn apply_occlusion(&mut self, mut candidate: DetectionCandidate, frame_index: u64) -> FilteredDetection {
        match candidate.track_id {
            Some(track_id) => {
                let (detector, last_seen) = self
                    .occlusion_states
                    .entry(track_id)
                    .or_insert_with(|| (OcclusionDetector::new(self.occlusion_config.clone()), frame_index));
                *last_seen = frame_index;
                let result = detector.process(&candidate.pose);
                candidate.pose = result.pose;
                FilteredDetection {
                    candidate,
                    occluded: result.occluded,
                }
            }
            None => {
                let visible = candidate
                    .pose
                    .visible_ratio(self.occlusion_config.joint_confidence);
                let occluded = visible < 1.0 - self.occlusion_config.occlusion_threshold;
                FilteredDetection { candidate, occluded }
            }
        }
    }

    /// Per-stage rejection counters.
    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    /// Clear all mutable state. Called on session end or template change.
    pub fn reset(&mut self) {
        self.velocity.reset();
        self.occlusion_states.clear();
        self.stats = FilterStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::test_support::standing_pose;
    use kinefit_models::{BoundingBox, Pose};

    fn good_candidate(cx: f64, track_id: u32) -> DetectionCandidate {
        let pose = standing_pose(cx, 200.0, 1.0, 0.9);
        DetectionCandidate::with_track(
            BoundingBox::new(cx - 60.0, 180.0, 120.0, 320.0),
            pose,
            0.9,
            track_id,
        )
    }

    #[test]
    fn test_config_decodes_from_json() {
        // Callers ship per-filter thresholds as plain values
        let json = r#"{
            "spatial": {
                "min_bbox_height": 60.0,
                "max_height_ratio": 0.9,
                "min_aspect_ratio": 0.25,
                "max_aspect_ratio": 0.75,
                "edge_margin": 12.0
            },
            "geometric": {
                "min_keypoint_confidence": 0.25,
                "min_torso_leg_ratio": 0.4,
                "max_torso_leg_ratio": 1.1,
                "max_head_offset_ratio": 0.35,
                "min_symmetry_score": 0.5
            },
            "ghost": {
                "min_confident_joints": 6,
                "joint_confidence": 0.3,
                "min_torso_px": 40.0,
                "max_torso_px": 400.0,
                "max_arm_asymmetry": 2.0,
                "iou_threshold": 0.5
            },
            "velocity": {
                "max_velocity": 40.0,
                "max_jump_distance": 120.0,
                "history_len": 30,
                "evict_after_frames": 90
            },
            "occlusion": {
                "occlusion_threshold": 0.3,
                "joint_confidence": 0.3,
                "interpolate": true,
                "history_frames": 5,
                "synthetic_confidence": 0.5
            }
        }"#;

        let config: FilterPipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.spatial.min_bbox_height, 60.0);
        assert_eq!(config.ghost.min_confident_joints, 6);
        assert_eq!(config.velocity.max_jump_distance, 120.0);
    }

    #[test]
    fn test_good_detection_survives() {
        let mut pipeline = FilterPipeline::new(FilterPipelineConfig::default());
        let out = pipeline.process_frame(0, 1920, 1080, vec![good_candidate(400.0, 1)]);
        assert_eq!(out.len(), 1);
        assert!(!out[0].occluded);
    }

    #[test]
    fn test_spatial_rejection_counted_first() {
        let mut pipeline = FilterPipeline::new(FilterPipelineConfig::default());
        // Tiny box with an (otherwise) pathological pose: only the spatial
        // counter moves, proving later stages never saw it.
        let det = DetectionCandidate::new(
            BoundingBox::new(0.0, 0.0, 10.0, 20.0),
            Pose::default(),
            0.9,
        );
        let out = pipeline.process_frame(0, 1920, 1080, vec![det]);
        assert!(out.is_empty());
        let stats = pipeline.stats();
        assert_eq!(stats.rejected_spatial, 1);
        assert_eq!(stats.rejected_geometric, 0);
        assert_eq!(stats.rejected_ghost, 0);
        assert_eq!(stats.rejected_velocity, 0);
    }

    #[test]
    fn test_empty_pose_rejected_by_ghost() {
        let mut pipeline = FilterPipeline::new(FilterPipelineConfig::default());
        // Plausible box, no confident joints: geometric abstains, ghost rejects
        let det = DetectionCandidate::new(
            BoundingBox::new(400.0, 180.0, 120.0, 320.0),
            Pose::default(),
            0.9,
        );
        let out = pipeline.process_frame(0, 1920, 1080, vec![det]);
        assert!(out.is_empty());
        assert_eq!(pipeline.stats().rejected_ghost, 1);
    }

    #[test]
    fn test_track_jump_dropped() {
        let mut pipeline = FilterPipeline::new(FilterPipelineConfig::default());
        assert_eq!(
            pipeline
                .process_frame(0, 1920, 1080, vec![good_candidate(400.0, 7)])
                .len(),
            1
        );
        // Same track teleports 400px on the next frame
        let out = pipeline.process_frame(1, 1920, 1080, vec![good_candidate(800.0, 7)]);
        assert!(out.is_empty());
        assert_eq!(pipeline.stats().rejected_velocity, 1);
    }

    #[test]
    fn test_reset_clears_track_memory() {
        let mut pipeline = FilterPipeline::new(FilterPipelineConfig::default());
        pipeline.process_frame(0, 1920, 1080, vec![good_candidate(400.0, 7)]);
        pipeline.reset();
        // After reset the jump is a fresh first observation, so it passes
        let out = pipeline.process_frame(1, 1920, 1080, vec![good_candidate(800.0, 7)]);
        assert_eq!(out.len(), 1);
    }
}
