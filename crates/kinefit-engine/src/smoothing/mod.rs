//! Temporal smoothing of derived metrics and raw poses.
//!
//! Two smoother shapes share one set of window reductions:
//! - [`ScalarSmoother`] — bounded ring buffer over a single derived metric
//! - [`PoseSmoother`] — the same buffer shape over full 17-keypoint poses,
//!   with the confidence channel always taken from the newest frame
//!
//! Reductions: mean, median, Gaussian-weighted average (weights recomputed
//! for the current fill level), and local second-degree polynomial smoothing
//! that falls back to mean on a singular fit.

pub mod pose;
pub mod savgol;
pub mod scalar;

pub use pose::PoseSmoother;
pub use scalar::ScalarSmoother;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::stats;

/// Reduction applied over a smoothing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingMethod {
    /// Arithmetic mean of the window
    Mean,
    /// Median of the window (outlier-robust)
    Median,
    /// Gaussian-weighted average centered on the window midpoint
    Gaussian,
    /// Local second-degree polynomial fit evaluated at the window center
    SavitzkyGolay,
}

impl Default for SmoothingMethod {
    fn default() -> Self {
        Self::Mean
    }
}

/// Symmetric Gaussian weights for `fill` samples of a `window`-sized buffer,
/// normalized to sum 1.
///
/// Sigma follows the configured window, not the fill, so partial windows get
/// the same bell shape truncated to the available samples.
pub(crate) fn gaussian_weights(fill: usize, window: usize) -> Vec<f64> {
    if fill == 0 {
        return Vec::new();
    }

    let sigma = (window as f64 / 3.0).max(1.0);
    let center = (fill - 1) as f64 / 2.0;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut weights: Vec<f64> = (0..fill)
        .map(|i| {
            let offset = i as f64 - center;
            (-(offset * offset) / two_sigma_sq).exp()
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in &mut weights {
            *w /= total;
        }
    }
    weights
}

/// Reduce a window of finite samples to one value.
pub(crate) fn reduce(values: &[f64], method: SmoothingMethod, window: usize) -> f64 {
    match method {
        SmoothingMethod::Mean => stats::mean(values),
        SmoothingMethod::Median => stats::median(values),
        SmoothingMethod::Gaussian => {
            let weights = gaussian_weights(values.len(), window);
            values
                .iter()
                .zip(weights.iter())
                .map(|(v, w)| v * w)
                .sum()
        }
        SmoothingMethod::SavitzkyGolay => match savgol::smooth_center(values) {
            Some(v) => v,
            None => {
                warn!("singular polynomial fit over {} samples, using mean", values.len());
                stats::mean(values)
            }
        },
    }
}
