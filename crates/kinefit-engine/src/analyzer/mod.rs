//! Rhythm, distance and speed analysis over a rolling pose window.
//!
//! The analyzer owns a bounded window of timestamped poses (several seconds
//! at capture rate) and derives three independent signals from it:
//! - **Rhythm** — foot-lift cadence against the reference band
//! - **Distance** — leg-lift and arm-swing amplitudes against reference
//!   statistics
//! - **Speed** — ankle movement speed against absolute floor/ceiling
//!
//! Every check silently abstains (returns `None`) until the window spans
//! its minimum fill duration.

pub mod distance;
pub mod rhythm;
pub mod speed;
pub mod window;

pub use distance::{DistanceAssessment, RangeCheck};
pub use rhythm::RhythmAssessment;
pub use speed::{SpeedAssessment, SpeedVerdict};
pub use window::{PoseWindow, TimedPose};

use serde::{Deserialize, Serialize};

use kinefit_models::{GoldenTemplate, Pose};

use crate::error::{EngineError, EngineResult};

/// Metric id for the reference cadence statistic.
pub const METRIC_CADENCE: &str = "cadence";
/// Metric id for the reference leg-lift height statistic.
pub const METRIC_LEG_LIFT: &str = "leg_lift_height";
/// Metric id for the reference arm-swing height statistic.
pub const METRIC_ARM_SWING: &str = "arm_swing_height";

/// Position of an observation relative to a reference band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandVerdict {
    /// Below mean − sigma_band × std (too slow / too small)
    Below,
    /// Inside the band
    Within,
    /// Above mean + sigma_band × std (too fast / too large)
    Above,
}

/// Configuration for the motion analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Window capacity in poses (default: 150, ~5s at 30fps)
    pub window_capacity: usize,
    /// Minimum window span before any verdict (default: 1.5s)
    pub min_window_seconds: f64,
    /// Minimum keypoint confidence for a joint to contribute (default: 0.3)
    pub min_joint_confidence: f64,
    /// Minimum frame separation between foot-lift peaks (default: 8)
    pub min_peak_separation: usize,
    /// Reference band half-width in standard deviations (default: 2.0)
    pub sigma_band: f64,
    /// Absolute floor on window-average ankle speed in px/s (default: 5.0)
    pub speed_floor: f64,
    /// Absolute ceiling on window-maximum ankle speed in px/s
    /// (default: 800.0)
    pub speed_ceiling: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_capacity: 150,
            min_window_seconds: 1.5,
            min_joint_confidence: 0.3,
            min_peak_separation: 8,
            sigma_band: 2.0,
            speed_floor: 5.0,
            speed_ceiling: 800.0,
        }
    }
}

/// Combined analyzer output; absent parts abstained.
#[derive(Debug, Clone, Default)]
pub struct MotionReport {
    pub rhythm: Option<RhythmAssessment>,
    pub distance: Option<DistanceAssessment>,
    pub speed: Option<SpeedAssessment>,
}

/// Rolling-window motion analyzer for one evaluation context.
#[derive(Debug, Clone)]
pub struct MotionAnalyzer {
    config: AnalyzerConfig,
    window: PoseWindow,
}

impl MotionAnalyzer {
    /// Create an analyzer with the given config.
    pub fn new(config: AnalyzerConfig) -> EngineResult<Self> {
        if config.window_capacity < 2 {
            return Err(EngineError::WindowTooSmall {
                min: 2,
                got: config.window_capacity,
            });
        }
        if !(config.min_window_seconds > 0.0) {
            return Err(EngineError::invalid_config(
                "min_window_seconds must be positive",
            ));
        }
        let window = PoseWindow::new(config.window_capacity);
        Ok(Self { config, window })
    }

    /// Push one filtered pose into the rolling window.
    pub fn push(&mut self, frame_index: u64, timestamp: f64, pose: Pose) {
        self.window.push(frame_index, timestamp, pose);
    }

    /// Run all three checks against the current window.
    pub fn analyze(&self, template: &GoldenTemplate) -> MotionReport {
        MotionReport {
            rhythm: rhythm::assess(&self.window, template, &self.config),
            distance: distance::assess(&self.window, template, &self.config),
            speed: speed::assess(&self.window, &self.config),
        }
    }

    /// Number of buffered poses.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Clear the window. Called on session end or template change.
    pub fn reset(&mut self) {
        self.window.reset();
    }
}
