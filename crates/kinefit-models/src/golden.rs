//! Golden (reference) template statistics.
//!
//! A golden template is the precomputed mean/std per metric from a canonical
//! correct performance. Statistics may exist combined, split by side, or
//! both; the engine resolves whichever is available.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error_report::Side;

/// Reference mean/std for one metric (or one side of it).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldenStatistic {
    /// Reference mean value
    pub mean: f64,
    /// Reference standard deviation; absent when the template was built from
    /// too few samples
    pub std: Option<f64>,
}

impl GoldenStatistic {
    /// Create a statistic with a known deviation.
    pub fn new(mean: f64, std: f64) -> Self {
        Self {
            mean,
            std: Some(std),
        }
    }

    /// Create a mean-only statistic.
    pub fn mean_only(mean: f64) -> Self {
        Self { mean, std: None }
    }

    /// Standard deviation, filtered to usable values.
    ///
    /// Negative or non-finite deviations count as missing — the threshold
    /// manager then falls back to its default.
    pub fn usable_std(&self) -> Option<f64> {
        self.std.filter(|s| s.is_finite() && *s >= 0.0)
    }
}

/// Per-metric statistics with an optional left/right split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    /// Side-agnostic statistic, when the template provides one
    pub combined: Option<GoldenStatistic>,
    /// Left-side statistic
    pub left: Option<GoldenStatistic>,
    /// Right-side statistic
    pub right: Option<GoldenStatistic>,
}

impl MetricStats {
    /// Combined-only statistics.
    pub fn combined(stat: GoldenStatistic) -> Self {
        Self {
            combined: Some(stat),
            ..Default::default()
        }
    }

    /// Side-split statistics.
    pub fn split(left: GoldenStatistic, right: GoldenStatistic) -> Self {
        Self {
            combined: None,
            left: Some(left),
            right: Some(right),
        }
    }

    /// Statistic for one side, if split data exists.
    pub fn for_side(&self, side: Side) -> Option<&GoldenStatistic> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    /// Resolve a usable statistic: the combined one when present, otherwise
    /// the average of whichever sides exist.
    pub fn resolved(&self) -> Option<GoldenStatistic> {
        if let Some(stat) = self.combined {
            return Some(stat);
        }
        match (self.left, self.right) {
            (Some(l), Some(r)) => Some(GoldenStatistic {
                mean: (l.mean + r.mean) / 2.0,
                std: match (l.usable_std(), r.usable_std()) {
                    (Some(ls), Some(rs)) => Some((ls + rs) / 2.0),
                    (Some(s), None) | (None, Some(s)) => Some(s),
                    (None, None) => None,
                },
            }),
            (Some(single), None) | (None, Some(single)) => Some(single),
            (None, None) => None,
        }
    }

    /// All usable std values this metric contributes to difficulty grading.
    pub fn usable_stds(&self) -> impl Iterator<Item = f64> + '_ {
        self.combined
            .iter()
            .chain(self.left.iter())
            .chain(self.right.iter())
            .filter_map(|s| s.usable_std())
    }
}

/// Reference template: per-metric statistics plus body-scale context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoldenTemplate {
    /// Statistics keyed by metric id (e.g. "leg_lift_height")
    pub metrics: HashMap<String, MetricStats>,
    /// Torso length of the reference performer, in pixels
    pub torso_length: f64,
}

impl GoldenTemplate {
    /// Create an empty template with a reference torso length.
    pub fn new(torso_length: f64) -> Self {
        Self {
            metrics: HashMap::new(),
            torso_length,
        }
    }

    /// Insert statistics for a metric.
    pub fn insert(&mut self, metric: impl Into<String>, stats: MetricStats) {
        self.metrics.insert(metric.into(), stats);
    }

    /// Statistics for a metric id.
    pub fn stats(&self, metric: &str) -> Option<&MetricStats> {
        self.metrics.get(metric)
    }
}

/// Inherent variability class of a reference template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Low-variance template, thresholds loosened
    Easy,
    /// Typical variance
    Medium,
    /// High-variance template, thresholds tightened
    Hard,
    /// No usable statistics to grade from
    Unknown,
}

impl Difficulty {
    /// Multiplier adjustment applied to the threshold's sigma multiplier.
    pub fn multiplier_factor(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Hard => 0.8,
            Difficulty::Medium | Difficulty::Unknown => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Unknown => "unknown",
        }
    }
}
