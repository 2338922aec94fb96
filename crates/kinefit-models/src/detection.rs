//! Pre-filter detection candidates.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::keypoint::Pose;

/// One person-detection proposal for one frame, before reliability filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionCandidate {
    /// Bounding box of the detected person
    pub bbox: BoundingBox,
    /// 17-keypoint pose inside the box
    pub pose: Pose,
    /// Detector confidence score (0.0-1.0)
    pub score: f64,
    /// Track ID once an external tracker has linked identity across frames
    pub track_id: Option<u32>,
}

impl DetectionCandidate {
    /// Create an unlinked candidate.
    pub fn new(bbox: BoundingBox, pose: Pose, score: f64) -> Self {
        Self {
            bbox,
            pose,
            score,
            track_id: None,
        }
    }

    /// Create a candidate already linked to a track.
    pub fn with_track(bbox: BoundingBox, pose: Pose, score: f64, track_id: u32) -> Self {
        Self {
            bbox,
            pose,
            score,
            track_id: Some(track_id),
        }
    }
}
