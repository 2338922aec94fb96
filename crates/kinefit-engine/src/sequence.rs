//! Error-sequence aggregation.
//!
//! A batch pass over an ordered [`FrameError`] stream: errors are
//! partitioned by (kind, part, side) — partitions are scanned in parallel
//! since their run detection is independent — and maximal contiguous runs
//! meeting the minimum length collapse into one [`ErrorSequence`] with a
//! single bounded deduction. A persistent small deviation is thereby
//! penalized far less than its naive per-frame total, while short sharp
//! errors keep near-original weight. The pass is stateless across calls.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use kinefit_models::{BodyPart, ErrorKind, ErrorSequence, FrameError};

use crate::stats;

/// How a run's severity is aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityAggregation {
    Mean,
    Median,
    Max,
}

/// Configuration for sequence aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Minimum run length to form a sequence (default: 3)
    pub min_run_length: usize,
    /// Maximum frame-index gap between consecutive run members
    /// (default: 2 — a run survives one missing frame; 1 means strictly
    /// consecutive)
    pub max_frame_gap: u64,
    /// Severity aggregation over the run (default: mean)
    pub severity_aggregation: SeverityAggregation,
    /// Cap on a sequence's deduction, in multiples of the run's mean
    /// per-frame deduction (default: 10.0)
    pub duration_cap: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            min_run_length: 3,
            max_frame_gap: 2,
            severity_aggregation: SeverityAggregation::Mean,
            duration_cap: 10.0,
        }
    }
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    /// Runs that met the minimum length, one scored unit each
    pub sequences: Vec<ErrorSequence>,
    /// Errors from runs below the minimum length, unchanged
    pub standalone: Vec<FrameError>,
}

impl AggregationResult {
    /// Total deduction across sequences and standalone errors.
    pub fn total_deduction(&self) -> f64 {
        let sequences: f64 = self.sequences.iter().map(|s| s.deduction).sum();
        let standalone: f64 = self.standalone.iter().map(|e| e.deduction).sum();
        sequences + standalone
    }
}

/// Stateless batch aggregator over completed or windowed error lists.
#[derive(Debug, Clone)]
pub struct SequenceAggregator {
    config: SequenceConfig,
}

impl SequenceAggregator {
    /// Create an aggregator with the given config.
    pub fn new(config: SequenceConfig) -> Self {
        Self { config }
    }

    /// Aggregate a batch of frame errors.
    pub fn aggregate(&self, errors: &[FrameError]) -> AggregationResult {
        let mut partitions: HashMap<(ErrorKind, BodyPart), Vec<FrameError>> = HashMap::new();
        for error in errors {
            partitions
                .entry(error.group_key())
                .or_default()
                .push(error.clone());
        }

        // Run detection in one partition is order-independent of the others
        let per_partition: Vec<(Vec<ErrorSequence>, Vec<FrameError>)> = partitions
            .into_par_iter()
            .map(|(_, group)| self.scan_partition(group))
            .collect();

        let mut result = AggregationResult::default();
        for (sequences, standalone) in per_partition {
            result.sequences.extend(sequences);
            result.standalone.extend(standalone);
        }
        result.sequences.sort_by_key(|s| s.start_frame);
        result.standalone.sort_by_key(|e| e.frame_index);
        result
    }

    /// Scan one same-(kind, part, side) partition for maximal runs.
    fn scan_partition(
        &self,
        mut group: Vec<FrameError>,
    ) -> (Vec<ErrorSequence>, Vec<FrameError>) {
        group.sort_by_key(|e| e.frame_index);

        let mut sequences = Vec::new();
        let mut standalone = Vec::new();
        let mut run: Vec<FrameError> = Vec::new();

        for error in group {
            let contiguous = run
                .last()
                .map(|prev: &FrameError| {
                    error.frame_index.saturating_sub(prev.frame_index) <= self.config.max_frame_gap
                })
                .unwrap_or(true);

            if contiguous {
                run.push(error);
            } else {
                self.flush_run(&mut run, &mut sequences, &mut standalone);
                run.push(error);
            }
        }
        self.flush_run(&mut run, &mut sequences, &mut standalone);

        (sequences, standalone)
    }

    fn flush_run(
        &self,
        run: &mut Vec<FrameError>,
        sequences: &mut Vec<ErrorSequence>,
        standalone: &mut Vec<FrameError>,
    ) {
        if run.is_empty() {
            return;
        }
        if run.len() < self.config.min_run_length {
            standalone.append(run);
            return;
        }

        let severities: Vec<f64> = run.iter().map(|e| e.severity).collect();
        let severity = match self.config.severity_aggregation {
            SeverityAggregation::Mean => stats::mean(&severities),
            SeverityAggregation::Median => stats::median(&severities),
            SeverityAggregation::Max => stats::finite_max(&severities).unwrap_or(0.0),
        };

        let deductions: Vec<f64> = run.iter().map(|e| e.deduction).collect();
        let mean_deduction = stats::mean(&deductions);

        // Bounded sub-linear pricing: a run costs its mean per-frame
        // deduction times (1 + ln n), capped in frame-equivalents.
        let frame_count = run.len();
        let deduction = (mean_deduction * (1.0 + (frame_count as f64).ln()))
            .min(mean_deduction * self.config.duration_cap);

        let first = run.first().expect("non-empty run");
        let last = run.last().expect("non-empty run");
        sequences.push(ErrorSequence {
            kind: first.kind,
            part: first.part,
            severity,
            deduction,
            start_frame: first.frame_index,
            end_frame: last.frame_index,
            frame_count,
        });
        run.clear();
    }
}
