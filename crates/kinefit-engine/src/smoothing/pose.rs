//! Ring-buffer smoother over full 17-keypoint poses.

use std::collections::VecDeque;

use tracing::debug;

use kinefit_models::keypoint::{Pose, KEYPOINT_COUNT};

use crate::error::{EngineError, EngineResult};
use crate::smoothing::{reduce, SmoothingMethod};

/// Smoother over raw joint positions.
///
/// The x and y channels are reduced over the window; the confidence channel
/// is never smoothed — it is always taken from the most recent frame, so an
/// occluded joint cannot appear artificially confident.
#[derive(Debug, Clone)]
pub struct PoseSmoother {
    window: usize,
    method: SmoothingMethod,
    buffer: VecDeque<Pose>,
}

impl PoseSmoother {
    /// Create a pose smoother with the given window size.
    pub fn new(window: usize, method: SmoothingMethod) -> EngineResult<Self> {
        if window == 0 {
            return Err(EngineError::WindowTooSmall { min: 1, got: window });
        }
        Ok(Self {
            window,
            method,
            buffer: VecDeque::with_capacity(window),
        })
    }

    /// Push one pose. Poses with any non-finite coordinate are discarded.
    pub fn push(&mut self, pose: Pose) {
        if !pose.is_finite() {
            debug!("discarding pose with non-finite coordinates");
            return;
        }
        if self.buffer.len() == self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(pose);
    }

    /// Smoothed pose over the current window, or `None` while empty.
    pub fn value(&self) -> Option<Pose> {
        let latest = self.buffer.back()?;
        let mut smoothed = latest.clone();

        let mut xs = Vec::with_capacity(self.buffer.len());
        let mut ys = Vec::with_capacity(self.buffer.len());

        for joint in 0..KEYPOINT_COUNT {
            xs.clear();
            ys.clear();
            for pose in &self.buffer {
                xs.push(pose.keypoints[joint].x);
                ys.push(pose.keypoints[joint].y);
            }
            smoothed.keypoints[joint].x = reduce(&xs, self.method, self.window);
            smoothed.keypoints[joint].y = reduce(&ys, self.method, self.window);
            // confidence stays the latest frame's value
        }

        Some(smoothed)
    }

    /// Whether the window is at full capacity.
    pub fn is_ready(&self) -> bool {
        self.buffer.len() == self.window
    }

    /// Number of buffered poses.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no poses are buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear all state. Called on a new session or reference-template swap.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
