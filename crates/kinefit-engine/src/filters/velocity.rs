//! Velocity-based track filtering.
//!
//! Maintains an explicit arena of per-track motion states, each a bounded
//! (frame, bbox) history with a last-seen stamp. Observations that imply
//! implausible motion — sustained velocity over the maximum, or a
//! single-frame jump past the absolute distance bound (identity switch) —
//! are dropped for that frame. States for tracks no longer observed are
//! pruned explicitly rather than by map-entry lifetime.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use kinefit_models::{BoundingBox, DetectionCandidate};

/// Configuration for the velocity track filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityFilterConfig {
    /// Maximum inferred velocity in pixels per frame (default: 50.0)
    pub max_velocity: f64,
    /// Maximum single-frame center jump in pixels (default: 150.0)
    pub max_jump_distance: f64,
    /// Bounded history length per track (default: 30)
    pub history_len: usize,
    /// Frames without observation before a track state is evicted
    /// (default: 90)
    pub evict_after_frames: u64,
}

impl Default for VelocityFilterConfig {
    fn default() -> Self {
        Self {
            max_velocity: 50.0,
            max_jump_distance: 150.0,
            history_len: 30,
            evict_after_frames: 90,
        }
    }
}

/// Motion state for one track.
#[derive(Debug, Clone)]
struct TrackMotionState {
    /// Bounded (frame index, bbox) history, oldest first
    history: VecDeque<(u64, BoundingBox)>,
    /// Frame the track was last observed on
    last_seen: u64,
}

impl TrackMotionState {
    fn new(frame_index: u64, bbox: BoundingBox, capacity: usize) -> Self {
        let mut history = VecDeque::with_capacity(capacity);
        history.push_back((frame_index, bbox));
        Self {
            history,
            last_seen: frame_index,
        }
    }

    fn record(&mut self, frame_index: u64, bbox: BoundingBox, capacity: usize) {
        if self.history.len() == capacity {
            self.history.pop_front();
        }
        self.history.push_back((frame_index, bbox));
        self.last_seen = frame_index;
    }
}

/// Per-track motion plausibility filter.
#[derive(Debug, Clone)]
pub struct VelocityTrackFilter {
    config: VelocityFilterConfig,
    tracks: HashMap<u32, TrackMotionState>,
}

impl VelocityTrackFilter {
    /// Create a filter with the given config.
    pub fn new(config: VelocityFilterConfig) -> Self {
        Self {
            config,
            tracks: HashMap::new(),
        }
    }

    /// Whether the observation is motion-plausible for its track.
    ///
    /// Accepted observations are recorded into the track history; rejected
    /// ones are dropped without touching it. Candidates without a track id
    /// pass through unchecked.
    pub fn accept(&mut self, candidate: &DetectionCandidate, frame_index: u64) -> bool {
        let Some(track_id) = candidate.track_id else {
            return true;
        };

        let state = match self.tracks.entry(track_id) {
            Entry::Vacant(entry) => {
                entry.insert(TrackMotionState::new(
                    frame_index,
                    candidate.bbox,
                    self.config.history_len,
                ));
                return true;
            }
            Entry::Occupied(entry) => entry.into_mut(),
        };

        let &(last_frame, last_bbox) = state
            .history
            .back()
            .expect("track state always holds at least one observation");

        // Frames arrive strictly monotonically per context; an equal or
        // earlier index means the caller broke that contract, so abstain.
        if frame_index <= last_frame {
            debug!(track_id, frame_index, last_frame, "non-monotonic frame, skipping check");
            return true;
        }

        let elapsed = (frame_index - last_frame) as f64;
        let displacement = candidate.bbox.center_distance(&last_bbox);
        let velocity = displacement / elapsed;

        if velocity > self.config.max_velocity {
            debug!(track_id, velocity, "velocity above maximum, dropping observation");
            return false;
        }

        if frame_index - last_frame == 1 && displacement > self.config.max_jump_distance {
            debug!(
                track_id,
                displacement, "single-frame jump beyond bound, dropping observation"
            );
            return false;
        }

        state.record(frame_index, candidate.bbox, self.config.history_len);
        true
    }

    /// Evict states for tracks not observed within the eviction window.
    pub fn prune(&mut self, current_frame: u64) {
        let horizon = self.config.evict_after_frames;
        let before = self.tracks.len();
        self.tracks
            .retain(|_, state| current_frame.saturating_sub(state.last_seen) <= horizon);
        let evicted = before - self.tracks.len();
        if evicted > 0 {
            debug!(evicted, "pruned stale track states");
        }
    }

    /// Number of live track states.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Clear all track state. Called on session end or template change.
    pub fn reset(&mut self) {
        self.tracks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinefit_models::Pose;

    fn tracked(x: f64, track_id: u32) -> DetectionCandidate {
        DetectionCandidate::with_track(
            BoundingBox::new(x, 100.0, 100.0, 300.0),
            Pose::default(),
            0.9,
            track_id,
        )
    }

    #[test]
    fn test_first_observation_accepted() {
        let mut filter = VelocityTrackFilter::new(VelocityFilterConfig::default());
        assert!(filter.accept(&tracked(100.0, 1), 0));
        assert_eq!(filter.track_count(), 1);
    }

    #[test]
    fn test_slow_motion_accepted() {
        let mut filter = VelocityTrackFilter::new(VelocityFilterConfig::default());
        assert!(filter.accept(&tracked(100.0, 1), 0));
        assert!(filter.accept(&tracked(110.0, 1), 1));
        assert!(filter.accept(&tracked(125.0, 1), 2));
    }

    #[test]
    fn test_jump_beyond_bound_dropped() {
        let mut filter = VelocityTrackFilter::new(VelocityFilterConfig::default());
        assert!(filter.accept(&tracked(100.0, 1), 0));
        // 200px in one frame exceeds max_jump_distance (and max_velocity)
        assert!(!filter.accept(&tracked(300.0, 1), 1));
    }

    #[test]
    fn test_rejection_leaves_history_untouched() {
        let mut filter = VelocityTrackFilter::new(VelocityFilterConfig::default());
        assert!(filter.accept(&tracked(100.0, 1), 0));
        assert!(!filter.accept(&tracked(400.0, 1), 1));
        // The track anchor is still at 100, so a return near it is accepted
        assert!(filter.accept(&tracked(110.0, 1), 2));
    }

    #[test]
    fn test_sustained_velocity_rejected_over_gap() {
        let config = VelocityFilterConfig {
            max_velocity: 10.0,
            max_jump_distance: 1_000.0,
            ..Default::default()
        };
        let mut filter = VelocityTrackFilter::new(config);
        assert!(filter.accept(&tracked(100.0, 1), 0));
        // 120px over 4 frames = 30 px/frame > 10
        assert!(!filter.accept(&tracked(220.0, 1), 4));
    }

    #[test]
    fn test_untracked_candidate_passes() {
        let mut filter = VelocityTrackFilter::new(VelocityFilterConfig::default());
        let det = DetectionCandidate::new(
            BoundingBox::new(0.0, 0.0, 100.0, 300.0),
            Pose::default(),
            0.9,
        );
        assert!(filter.accept(&det, 0));
        assert_eq!(filter.track_count(), 0);
    }

    #[test]
    fn test_prune_evicts_stale_tracks() {
        let config = VelocityFilterConfig {
            evict_after_frames: 10,
            ..Default::default()
        };
        let mut filter = VelocityTrackFilter::new(config);
        filter.accept(&tracked(100.0, 1), 0);
        filter.accept(&tracked(500.0, 2), 8);

        filter.prune(15);
        assert_eq!(filter.track_count(), 1);

        filter.prune(30);
        assert_eq!(filter.track_count(), 0);
    }
}
