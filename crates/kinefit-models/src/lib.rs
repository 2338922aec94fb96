//! Shared data models for the KineFit scoring core.
//!
//! This crate provides Serde-serializable types for:
//! - Keypoints, poses and bounding boxes
//! - Pre-filter detection candidates
//! - Golden (reference) template statistics
//! - Frame errors and aggregated error sequences

pub mod bbox;
pub mod detection;
pub mod error_report;
pub mod golden;
pub mod keypoint;

// Re-export common types
pub use bbox::BoundingBox;
pub use detection::DetectionCandidate;
pub use error_report::{BodyPart, ErrorKind, ErrorSequence, FrameError, Side};
pub use golden::{Difficulty, GoldenStatistic, GoldenTemplate, MetricStats};
pub use keypoint::{Keypoint, KeypointIndex, Pose};
