//! Frame-level errors and aggregated error sequences.
//!
//! Body parts are a flat tagged variant rather than a per-part type
//! hierarchy; the side lives inside the variant for paired parts.

use serde::{Deserialize, Serialize};

/// Body side for paired parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Body part a frame error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Nose,
    Head,
    Torso,
    Shoulder(Side),
    Arm(Side),
    Hip(Side),
    Leg(Side),
    Ankle(Side),
}

impl BodyPart {
    /// Side of the part, when it is a paired part.
    pub fn side(&self) -> Option<Side> {
        match self {
            BodyPart::Nose | BodyPart::Head | BodyPart::Torso => None,
            BodyPart::Shoulder(s)
            | BodyPart::Arm(s)
            | BodyPart::Hip(s)
            | BodyPart::Leg(s)
            | BodyPart::Ankle(s) => Some(*s),
        }
    }
}

/// Kind of deviation a frame error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A positional metric left its adaptive threshold band
    Position,
    /// A joint angle metric left its band
    Angle,
    /// Cadence outside the reference band
    Rhythm,
    /// Movement amplitude outside the reference band
    Distance,
    /// Movement speed outside the absolute floor/ceiling
    Speed,
}

/// One scored deviation on one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameError {
    /// What kind of deviation this is
    pub kind: ErrorKind,
    /// Body part the deviation is attributed to
    pub part: BodyPart,
    /// How far past the threshold the observation was, as a ratio (1.0 = at
    /// the threshold)
    pub severity: f64,
    /// Score deduction for this single frame
    pub deduction: f64,
    /// Frame the deviation was observed on
    pub frame_index: u64,
    /// Capture timestamp in seconds
    pub timestamp: f64,
}

impl FrameError {
    /// Side of the affected part, when the part is paired.
    pub fn side(&self) -> Option<Side> {
        self.part.side()
    }

    /// Grouping key for sequence aggregation. Runs never cross this boundary.
    pub fn group_key(&self) -> (ErrorKind, BodyPart) {
        (self.kind, self.part)
    }
}

/// A maximal contiguous run of same-kind frame errors collapsed into one
/// scored unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSequence {
    /// Kind shared by every error in the run
    pub kind: ErrorKind,
    /// Part (including side) shared by every error in the run
    pub part: BodyPart,
    /// Aggregated severity of the run
    pub severity: f64,
    /// Single bounded deduction for the whole run
    pub deduction: f64,
    /// First frame of the run
    pub start_frame: u64,
    /// Last frame of the run
    pub end_frame: u64,
    /// Number of frame errors collapsed into the run
    pub frame_count: usize,
}

impl ErrorSequence {
    /// Side of the affected part, when the part is paired.
    pub fn side(&self) -> Option<Side> {
        self.part.side()
    }
}
