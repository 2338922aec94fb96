//! Statistics-driven adaptive thresholds.
//!
//! Converts a reference template's per-metric variability into a usable
//! error threshold: a three-sigma band bounded to a ratio of the metric's
//! default, scaled for template difficulty and performer height. Computed
//! values are cached by the full input tuple; the cache must be cleared
//! when a new reference template loads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kinefit_models::{Difficulty, GoldenStatistic, GoldenTemplate};

/// Configuration for adaptive threshold computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Sigma multiplier (default: 3.0 — the three-sigma rule)
    pub multiplier: f64,
    /// Lower bound as a ratio of the metric default (default: 0.3)
    pub min_ratio: f64,
    /// Upper bound as a ratio of the metric default (default: 2.0)
    pub max_ratio: f64,
    /// Lower clamp of the performer/reference height factor (default: 0.7)
    pub min_height_factor: f64,
    /// Upper clamp of the performer/reference height factor (default: 1.3)
    pub max_height_factor: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            multiplier: 3.0,
            min_ratio: 0.3,
            max_ratio: 2.0,
            min_height_factor: 0.7,
            max_height_factor: 1.3,
        }
    }
}

/// Cache key: the full tuple a threshold depends on. Float fields are keyed
/// by their bit patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ThresholdKey {
    metric: String,
    mean_bits: u64,
    std_bits: u64,
    difficulty: Difficulty,
    torso_bits: u64,
}

impl ThresholdKey {
    fn new(
        metric: &str,
        stat: &GoldenStatistic,
        difficulty: Difficulty,
        performer_torso: Option<f64>,
    ) -> Self {
        Self {
            metric: metric.to_string(),
            mean_bits: stat.mean.to_bits(),
            std_bits: stat.std.map(f64::to_bits).unwrap_or(u64::MAX),
            difficulty,
            torso_bits: performer_torso.map(f64::to_bits).unwrap_or(u64::MAX),
        }
    }
}

/// Per-metric adaptive threshold manager for one evaluation context.
#[derive(Debug, Clone)]
pub struct AdaptiveThresholdManager {
    config: ThresholdConfig,
    /// Torso length of the reference performer; non-positive disables
    /// height adjustment
    reference_torso: f64,
    cache: HashMap<ThresholdKey, f64>,
}

impl AdaptiveThresholdManager {
    /// Create a manager with the given config and no reference loaded.
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            config,
            reference_torso: 0.0,
            cache: HashMap::new(),
        }
    }

    /// Load a new reference template: takes its torso length and clears the
    /// cache, which is keyed against the previous template's statistics.
    pub fn load_template(&mut self, template: &GoldenTemplate) {
        self.reference_torso = template.torso_length;
        self.clear();
        debug!(torso = self.reference_torso, "reference template loaded");
    }

    /// Threshold for one metric observation context.
    ///
    /// `default` is the metric's configured fallback threshold;
    /// `performer_torso` enables height adjustment when present.
    pub fn threshold(
        &mut self,
        metric: &str,
        stat: &GoldenStatistic,
        default: f64,
        difficulty: Difficulty,
        performer_torso: Option<f64>,
    ) -> f64 {
        let key = ThresholdKey::new(metric, stat, difficulty, performer_torso);
        if let Some(&cached) = self.cache.get(&key) {
            return cached;
        }

        let value = self.compute(stat, default, difficulty, performer_torso);
        self.cache.insert(key, value);
        value
    }

    fn compute(
        &self,
        stat: &GoldenStatistic,
        default: f64,
        difficulty: Difficulty,
        performer_torso: Option<f64>,
    ) -> f64 {
        let height_factor = self.height_factor(performer_torso);

        // A non-positive default cannot form a bounding band; treat it like
        // missing statistics and fall through to the default path.
        let min_bound = default * self.config.min_ratio;
        let max_bound = default * self.config.max_ratio;

        match stat.usable_std().filter(|_| min_bound <= max_bound) {
            Some(std) => {
                let multiplier = self.config.multiplier * difficulty.multiplier_factor();
                let bounded = (multiplier * std).clamp(min_bound, max_bound);
                bounded * height_factor
            }
            // Missing or negative deviation: difficulty- and height-adjusted
            // default
            None => default * difficulty.multiplier_factor() * height_factor,
        }
    }

    /// Performer/reference torso ratio, clamped. Unknown performer height or
    /// an unusable reference length disable the adjustment.
    fn height_factor(&self, performer_torso: Option<f64>) -> f64 {
        match performer_torso {
            Some(torso) if torso > 0.0 && self.reference_torso > 0.0 => (torso
                / self.reference_torso)
                .clamp(self.config.min_height_factor, self.config.max_height_factor),
            _ => 1.0,
        }
    }

    /// Number of cached thresholds.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop all cached thresholds.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Grade a template's inherent variability from its statistics.
///
/// Averages every usable per-metric std (side splits included, missing
/// entries ignored): `<10` → easy, `[10, 20)` → medium, `≥20` → hard.
/// Returns `(Unknown, 0.0)` when no usable value exists.
pub fn classify_difficulty(template: &GoldenTemplate) -> (Difficulty, f64) {
    let stds: Vec<f64> = template
        .metrics
        .values()
        .flat_map(|m| m.usable_stds())
        .collect();

    if stds.is_empty() {
        return (Difficulty::Unknown, 0.0);
    }

    let average = stds.iter().sum::<f64>() / stds.len() as f64;
    let difficulty = if average < 10.0 {
        Difficulty::Easy
    } else if average < 20.0 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    };
    (difficulty, average)
}
