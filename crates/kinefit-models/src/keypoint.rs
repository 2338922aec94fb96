//! Keypoint and pose primitives.
//!
//! A pose is a fixed-arity ordered collection of 17 COCO keypoints for one
//! person in one frame. Frames that do not decode to exactly 17 keypoints
//! are treated as "no usable detection" rather than an error.

use serde::{Deserialize, Serialize};

/// Number of keypoints in a pose.
pub const KEYPOINT_COUNT: usize = 17;

/// COCO-17 keypoint ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    /// Keypoint name as reported by COCO-style detectors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// A single detected keypoint with confidence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    /// X coordinate in pixels
    pub x: f64,
    /// Y coordinate in pixels
    pub y: f64,
    /// Detection confidence (0.0-1.0)
    pub confidence: f64,
}

impl Keypoint {
    /// Create a new keypoint.
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Whether the keypoint is confidently detected.
    #[inline]
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }

    /// Whether both coordinates are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another keypoint.
    pub fn distance_to(&self, other: &Keypoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between two keypoints; confidence is the minimum of the pair.
    pub fn midpoint(a: &Keypoint, b: &Keypoint) -> Keypoint {
        Keypoint {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
            confidence: a.confidence.min(b.confidence),
        }
    }
}

/// One frame's 17-keypoint pose for one detected person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: [Keypoint; KEYPOINT_COUNT],
}

impl Pose {
    /// Create a pose from an ordered keypoint array.
    pub fn new(keypoints: [Keypoint; KEYPOINT_COUNT]) -> Self {
        Self { keypoints }
    }

    /// Decode a pose from the detector's flat `17×3` layout
    /// (x, y, confidence per keypoint).
    ///
    /// Returns `None` when the slice has the wrong arity — the frame is then
    /// "no usable detection" for the caller.
    pub fn from_flat(values: &[f64]) -> Option<Self> {
        if values.len() != KEYPOINT_COUNT * 3 {
            return None;
        }
        let mut keypoints = [Keypoint::default(); KEYPOINT_COUNT];
        for (i, chunk) in values.chunks_exact(3).enumerate() {
            keypoints[i] = Keypoint::new(chunk[0], chunk[1], chunk[2]);
        }
        Some(Self { keypoints })
    }

    /// Keypoint at a COCO index.
    #[inline]
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// Number of keypoints at or above a confidence threshold.
    pub fn confident_count(&self, threshold: f64) -> usize {
        self.keypoints
            .iter()
            .filter(|k| k.is_confident(threshold))
            .count()
    }

    /// Fraction of keypoints at or above a confidence threshold.
    pub fn visible_ratio(&self, threshold: f64) -> f64 {
        self.confident_count(threshold) as f64 / KEYPOINT_COUNT as f64
    }

    /// Whether every keypoint has finite coordinates.
    pub fn is_finite(&self) -> bool {
        self.keypoints.iter().all(Keypoint::is_finite)
    }

    /// Mean confidence across all keypoints.
    pub fn average_confidence(&self) -> f64 {
        let sum: f64 = self.keypoints.iter().map(|k| k.confidence).sum();
        sum / KEYPOINT_COUNT as f64
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::default(); KEYPOINT_COUNT],
        }
    }
}
