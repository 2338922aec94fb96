//! Per-frame metric evaluation against adaptive thresholds.
//!
//! Turns a frame's observed metric samples into [`FrameError`]s: each sample
//! is compared to its golden statistic, using the side-split statistic when
//! the sampled part has a side and the template provides one. Metrics the
//! template does not know are skipped — no verdict, distinct from "no
//! error".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kinefit_models::{BodyPart, Difficulty, ErrorKind, FrameError, GoldenStatistic, GoldenTemplate};

use crate::threshold::{classify_difficulty, AdaptiveThresholdManager, ThresholdConfig};

/// One observed metric value on one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    /// Metric id matching the golden template (e.g. "leg_lift_height")
    pub metric: String,
    /// Error kind reported when the sample breaches its threshold
    pub kind: ErrorKind,
    /// Body part the sample is attributed to
    pub part: BodyPart,
    /// Observed value
    pub value: f64,
}

/// Configuration for frame evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Fallback default threshold for metrics without an entry in
    /// `default_thresholds` (default: 50.0)
    pub default_threshold: f64,
    /// Per-metric default thresholds
    pub default_thresholds: HashMap<String, f64>,
    /// Deduction per unit severity (default: 0.5)
    pub base_deduction: f64,
    /// Cap on a single frame's deduction (default: 2.0)
    pub max_frame_deduction: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            default_threshold: 50.0,
            default_thresholds: HashMap::new(),
            base_deduction: 0.5,
            max_frame_deduction: 2.0,
        }
    }
}

/// Evaluates observed metrics against the loaded golden template.
///
/// Owns the adaptive threshold manager; swapping the template reclassifies
/// difficulty and clears the threshold cache.
#[derive(Debug, Clone)]
pub struct FrameEvaluator {
    config: EvaluatorConfig,
    thresholds: AdaptiveThresholdManager,
    template: GoldenTemplate,
    difficulty: Difficulty,
}

impl FrameEvaluator {
    /// Create an evaluator for one reference template.
    pub fn new(
        config: EvaluatorConfig,
        threshold_config: ThresholdConfig,
        template: GoldenTemplate,
    ) -> Self {
        let mut thresholds = AdaptiveThresholdManager::new(threshold_config);
        thresholds.load_template(&template);
        let (difficulty, average_std) = classify_difficulty(&template);
        debug!(
            difficulty = difficulty.as_str(),
            average_std, "template difficulty classified"
        );
        Self {
            config,
            thresholds,
            template,
            difficulty,
        }
    }

    /// Swap the reference template: reclassifies difficulty and clears the
    /// threshold cache.
    pub fn set_template(&mut self, template: GoldenTemplate) {
        self.thresholds.load_template(&template);
        let (difficulty, _) = classify_difficulty(&template);
        self.difficulty = difficulty;
        self.template = template;
    }

    /// Difficulty class of the loaded template.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Evaluate one frame's samples, returning an error per breached metric.
    pub fn evaluate_frame(
        &mut self,
        frame_index: u64,
        timestamp: f64,
        performer_torso: Option<f64>,
        samples: &[MetricSample],
    ) -> Vec<FrameError> {
        let mut errors = Vec::new();

        for sample in samples {
            if !sample.value.is_finite() {
                debug!(metric = %sample.metric, "skipping non-finite sample");
                continue;
            }

            let Some(stat) = self.resolve_stat(&sample.metric, sample.part) else {
                continue;
            };

            let default = self
                .config
                .default_thresholds
                .get(&sample.metric)
                .copied()
                .unwrap_or(self.config.default_threshold);

            let threshold = self.thresholds.threshold(
                &sample.metric,
                &stat,
                default,
                self.difficulty,
                performer_torso,
            );
            if threshold <= 0.0 {
                continue;
            }

            let deviation = (sample.value - stat.mean).abs();
            if deviation <= threshold {
                continue;
            }

            let severity = deviation / threshold;
            let deduction =
                (self.config.base_deduction * severity).min(self.config.max_frame_deduction);

            errors.push(FrameError {
                kind: sample.kind,
                part: sample.part,
                severity,
                deduction,
                frame_index,
                timestamp,
            });
        }

        errors
    }

    /// Statistic for a sample: the side-split entry when the part has a side
    /// and the template provides one, the resolved statistic otherwise.
    fn resolve_stat(&self, metric: &str, part: BodyPart) -> Option<GoldenStatistic> {
        let stats = self.template.stats(metric)?;
        if let Some(side) = part.side() {
            if let Some(stat) = stats.for_side(side) {
                return Some(*stat);
            }
        }
        stats.resolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinefit_models::{MetricStats, Side};

    fn template_with(metric: &str, stats: MetricStats) -> GoldenTemplate {
        let mut template = GoldenTemplate::new(100.0);
        template.insert(metric, stats);
        template
    }

    fn sample(metric: &str, part: BodyPart, value: f64) -> MetricSample {
        MetricSample {
            metric: metric.to_string(),
            kind: ErrorKind::Position,
            part,
            value,
        }
    }

    #[test]
    fn test_within_threshold_no_error() {
        let template = template_with(
            "reach",
            MetricStats::combined(GoldenStatistic::new(100.0, 5.0)),
        );
        let mut evaluator =
            FrameEvaluator::new(EvaluatorConfig::default(), ThresholdConfig::default(), template);

        // Threshold is 15 (3 × 5, at the 50 × 0.3 floor); deviation 10 passes
        let errors =
            evaluator.evaluate_frame(0, 0.0, None, &[sample("reach", BodyPart::Torso, 110.0)]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_breach_produces_error() {
        let template = template_with(
            "reach",
            MetricStats::combined(GoldenStatistic::new(100.0, 5.0)),
        );
        let mut evaluator =
            FrameEvaluator::new(EvaluatorConfig::default(), ThresholdConfig::default(), template);

        let errors =
            evaluator.evaluate_frame(7, 0.23, None, &[sample("reach", BodyPart::Torso, 130.0)]);
        assert_eq!(errors.len(), 1);
        let error = &errors[0];
        assert_eq!(error.frame_index, 7);
        // Deviation 30 over threshold 15: severity 2
        assert!((error.severity - 2.0).abs() < 1e-9);
        assert!((error.deduction - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_side_split_statistic_used() {
        let template = template_with(
            "arm_swing_height",
            MetricStats::split(
                GoldenStatistic::new(50.0, 5.0),
                GoldenStatistic::new(200.0, 5.0),
            ),
        );
        let mut evaluator =
            FrameEvaluator::new(EvaluatorConfig::default(), ThresholdConfig::default(), template);

        // 60 is near the left mean but far from the right one
        let errors = evaluator.evaluate_frame(
            0,
            0.0,
            None,
            &[
                sample("arm_swing_height", BodyPart::Arm(Side::Left), 60.0),
                sample("arm_swing_height", BodyPart::Arm(Side::Right), 60.0),
            ],
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].part, BodyPart::Arm(Side::Right));
    }

    #[test]
    fn test_unknown_metric_skipped() {
        let template = template_with(
            "reach",
            MetricStats::combined(GoldenStatistic::new(100.0, 5.0)),
        );
        let mut evaluator =
            FrameEvaluator::new(EvaluatorConfig::default(), ThresholdConfig::default(), template);

        let errors = evaluator.evaluate_frame(
            0,
            0.0,
            None,
            &[sample("unmeasured", BodyPart::Torso, 1_000.0)],
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_frame_deduction_capped() {
        let template = template_with(
            "reach",
            MetricStats::combined(GoldenStatistic::new(100.0, 5.0)),
        );
        let mut evaluator =
            FrameEvaluator::new(EvaluatorConfig::default(), ThresholdConfig::default(), template);

        let errors = evaluator.evaluate_frame(
            0,
            0.0,
            None,
            &[sample("reach", BodyPart::Torso, 10_000.0)],
        );
        assert_eq!(errors[0].deduction, 2.0);
    }
}
