#![deny(unreachable_patterns)]
//! Signal-processing and adaptive-scoring engine for pose performance.
//!
//! This crate provides:
//! - Detection reliability filtering (spatial, geometric, ghost, velocity,
//!   occlusion)
//! - Temporal smoothing of derived metrics and raw poses
//! - Statistics-driven adaptive thresholds with difficulty and height
//!   adjustment
//! - Per-frame metric evaluation into frame errors
//! - Error-sequence aggregation with bounded deductions
//! - Rhythm/distance/speed analysis over a rolling pose window
//!
//! The engine is synchronous and performs no I/O. Every stateful component
//! is exclusively owned by one evaluation context; concurrent contexts use
//! independent instances. Frames and timestamps must arrive strictly
//! monotonically increasing per context.

pub mod analyzer;
pub mod error;
pub mod evaluator;
pub mod filters;
pub mod sequence;
pub mod skeleton;
pub mod smoothing;
pub mod stats;
pub mod threshold;

// Filtering exports
pub use filters::{
    FilterPipeline, FilterPipelineConfig, FilterStats, FilteredDetection, GeometricFilterConfig,
    GhostFilterConfig, OcclusionConfig, SpatialFilterConfig, VelocityFilterConfig,
};

// Smoothing exports
pub use smoothing::{PoseSmoother, ScalarSmoother, SmoothingMethod};

// Threshold and evaluation exports
pub use evaluator::{EvaluatorConfig, FrameEvaluator, MetricSample};
pub use threshold::{classify_difficulty, AdaptiveThresholdManager, ThresholdConfig};

// Aggregation exports
pub use sequence::{AggregationResult, SequenceAggregator, SequenceConfig, SeverityAggregation};

// Analyzer exports
pub use analyzer::{AnalyzerConfig, BandVerdict, MotionAnalyzer, MotionReport};

pub use error::{EngineError, EngineResult};
