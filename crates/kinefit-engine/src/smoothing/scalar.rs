//! Bounded ring-buffer smoother for a single derived metric.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::smoothing::{reduce, SmoothingMethod};

/// Smoother over one scalar metric series.
///
/// The buffer is exclusively owned by one evaluation context; concurrent
/// contexts must construct independent instances.
#[derive(Debug, Clone)]
pub struct ScalarSmoother {
    window: usize,
    method: SmoothingMethod,
    buffer: VecDeque<f64>,
}

impl ScalarSmoother {
    /// Create a smoother with the given window size.
    ///
    /// For [`SmoothingMethod::SavitzkyGolay`] the window is forced odd and at
    /// least 3 so a second-degree fit is always determined.
    pub fn new(window: usize, method: SmoothingMethod) -> EngineResult<Self> {
        if window == 0 {
            return Err(EngineError::WindowTooSmall { min: 1, got: window });
        }

        let window = if method == SmoothingMethod::SavitzkyGolay {
            let adjusted = if window < 3 {
                3
            } else if window % 2 == 0 {
                window + 1
            } else {
                window
            };
            if adjusted != window {
                debug!(requested = window, used = adjusted, "polynomial window adjusted");
            }
            adjusted
        } else {
            window
        };

        Ok(Self {
            window,
            method,
            buffer: VecDeque::with_capacity(window),
        })
    }

    /// Push one sample. Non-finite inputs are discarded before buffering.
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            debug!(value, "discarding non-finite sample");
            return;
        }
        if self.buffer.len() == self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    /// Smoothed value over the current window, or `None` while empty.
    pub fn value(&self) -> Option<f64> {
        if self.buffer.is_empty() {
            return None;
        }
        let values: Vec<f64> = self.buffer.iter().copied().collect();
        Some(reduce(&values, self.method, self.window))
    }

    /// Push a sample and return the smoothed value in one call.
    pub fn push_and_get(&mut self, value: f64) -> Option<f64> {
        self.push(value);
        self.value()
    }

    /// Whether the window is at full capacity. Callers gate verdicts on this
    /// during warm-up.
    pub fn is_ready(&self) -> bool {
        self.buffer.len() == self.window
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured window size (after any polynomial adjustment).
    pub fn window(&self) -> usize {
        self.window
    }

    /// Clear all state. Called on a new session or reference-template swap.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_over_full_window() {
        let mut smoother = ScalarSmoother::new(5, SmoothingMethod::Mean).unwrap();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            smoother.push(v);
        }
        assert!(smoother.is_ready());
        assert_eq!(smoother.value(), Some(3.0));
    }

    #[test]
    fn test_median_ignores_outlier_magnitude() {
        let mut a = ScalarSmoother::new(5, SmoothingMethod::Median).unwrap();
        let mut b = ScalarSmoother::new(5, SmoothingMethod::Median).unwrap();
        for v in [1.0, 2.0, 3.0, 4.0, 1_000.0] {
            a.push(v);
        }
        for v in [1.0, 2.0, 3.0, 4.0, 1_000_000.0] {
            b.push(v);
        }
        // Sorted middle value, independent of outlier magnitude
        assert_eq!(a.value(), Some(3.0));
        assert_eq!(a.value(), b.value());
    }

    #[test]
    fn test_non_finite_discarded() {
        let mut smoother = ScalarSmoother::new(3, SmoothingMethod::Mean).unwrap();
        smoother.push(1.0);
        smoother.push(f64::NAN);
        smoother.push(f64::INFINITY);
        smoother.push(f64::NEG_INFINITY);
        smoother.push(3.0);
        assert_eq!(smoother.len(), 2);
        assert_eq!(smoother.value(), Some(2.0));
    }

    #[test]
    fn test_not_ready_during_warmup() {
        let mut smoother = ScalarSmoother::new(4, SmoothingMethod::Mean).unwrap();
        smoother.push(1.0);
        smoother.push(2.0);
        assert!(!smoother.is_ready());
        // Value is still available for callers that accept partial windows
        assert_eq!(smoother.value(), Some(1.5));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut smoother = ScalarSmoother::new(3, SmoothingMethod::Mean).unwrap();
        for v in [1.0, 2.0, 3.0] {
            smoother.push(v);
        }
        assert!(smoother.is_ready());
        smoother.reset();
        assert!(smoother.is_empty());
        assert_eq!(smoother.value(), None);
    }

    #[test]
    fn test_savgol_window_forced_odd() {
        let smoother = ScalarSmoother::new(4, SmoothingMethod::SavitzkyGolay).unwrap();
        assert_eq!(smoother.window(), 5);
        let smoother = ScalarSmoother::new(1, SmoothingMethod::SavitzkyGolay).unwrap();
        assert_eq!(smoother.window(), 3);
    }

    #[test]
    fn test_savgol_falls_back_to_mean_when_short() {
        let mut smoother = ScalarSmoother::new(5, SmoothingMethod::SavitzkyGolay).unwrap();
        smoother.push(2.0);
        smoother.push(4.0);
        // Two samples cannot support a quadratic; mean fallback
        assert_eq!(smoother.value(), Some(3.0));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(ScalarSmoother::new(0, SmoothingMethod::Mean).is_err());
    }

    #[test]
    fn test_spike_suppression() {
        // 100-frame constant stream with one large spike: the mean smoother
        // must keep the output near the constant target.
        let mut smoother = ScalarSmoother::new(5, SmoothingMethod::Mean).unwrap();
        let target = 50.0;
        let mut worst_dev: f64 = 0.0;

        for frame in 0..100 {
            let raw = if frame == 60 { 500.0 } else { target };
            if let Some(smoothed) = smoother.push_and_get(raw) {
                if smoother.is_ready() {
                    worst_dev = worst_dev.max((smoothed - target).abs());
                }
            }
        }

        // Spike of 450 spread over a 5-wide window: at most 90 of deviation,
        // far below the raw 450 excursion.
        assert!(worst_dev <= 450.0 / 5.0 + 1e-9, "worst_dev={}", worst_dev);
    }
}
