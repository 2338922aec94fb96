//! Rolling window of timestamped poses.

use std::collections::VecDeque;

use tracing::debug;

use kinefit_models::Pose;

/// One pose with its capture context.
#[derive(Debug, Clone)]
pub struct TimedPose {
    pub frame_index: u64,
    /// Capture timestamp in seconds
    pub timestamp: f64,
    pub pose: Pose,
}

/// Bounded rolling window over the most recent poses of one context.
#[derive(Debug, Clone)]
pub struct PoseWindow {
    capacity: usize,
    frames: VecDeque<TimedPose>,
}

impl PoseWindow {
    /// Create a window holding up to `capacity` poses.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Push one pose. Non-finite poses and non-monotonic timestamps are
    /// discarded — the caller owns ordering, this is a last-resort guard.
    pub fn push(&mut self, frame_index: u64, timestamp: f64, pose: Pose) {
        if !timestamp.is_finite() || !pose.is_finite() {
            debug!(frame_index, "discarding unusable window sample");
            return;
        }
        if let Some(last) = self.frames.back() {
            if timestamp <= last.timestamp || frame_index <= last.frame_index {
                debug!(frame_index, "discarding out-of-order window sample");
                return;
            }
        }
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(TimedPose {
            frame_index,
            timestamp,
            pose,
        });
    }

    /// Time spanned by the buffered poses, in seconds.
    pub fn duration(&self) -> f64 {
        match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Whether the window spans at least `min_seconds` of samples.
    pub fn has_min_duration(&self, min_seconds: f64) -> bool {
        self.frames.len() >= 2 && self.duration() >= min_seconds
    }

    /// Buffered poses, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TimedPose> {
        self.frames.iter()
    }

    /// Number of buffered poses.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Clear all state. Called on session end or template change.
    pub fn reset(&mut self) {
        self.frames.clear();
    }
}
