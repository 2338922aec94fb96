//! Reliability pipeline and aggregation benchmarks.
//!
//! # Running Benchmarks
//! ```bash
//! cargo bench --package kinefit-engine --bench filter_pipeline
//! ```

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use kinefit_engine::filters::{FilterPipeline, FilterPipelineConfig};
use kinefit_engine::sequence::{SequenceAggregator, SequenceConfig};
use kinefit_models::keypoint::{Keypoint, Pose, KEYPOINT_COUNT};
use kinefit_models::{
    BodyPart, BoundingBox, DetectionCandidate, ErrorKind, FrameError, Side,
};

/// Synthetic candidate with a plausible standing pose that drifts slowly.
fn make_candidate(frame: u64, track_id: u32) -> DetectionCandidate {
    let cx = 400.0 + (frame % 30) as f64;
    let top_y = 200.0;

    let mut keypoints = [Keypoint::default(); KEYPOINT_COUNT];
    // (dx from center, dy from head top) per COCO index
    let layout: [(f64, f64); KEYPOINT_COUNT] = [
        (0.0, 0.0),     // nose
        (-4.0, -2.0),   // eyes
        (4.0, -2.0),
        (-8.0, 0.0),    // ears
        (8.0, 0.0),
        (-20.0, 30.0),  // shoulders
        (20.0, 30.0),
        (-25.0, 70.0),  // elbows
        (25.0, 70.0),
        (-28.0, 110.0), // wrists
        (28.0, 110.0),
        (-15.0, 110.0), // hips
        (15.0, 110.0),
        (-15.0, 170.0), // knees
        (15.0, 170.0),
        (-15.0, 230.0), // ankles
        (15.0, 230.0),
    ];
    for (kp, (dx, dy)) in keypoints.iter_mut().zip(layout) {
        kp.x = cx + dx;
        kp.y = top_y + dy;
        kp.confidence = 0.9;
    }

    DetectionCandidate::with_track(
        BoundingBox::new(cx - 60.0, 180.0, 120.0, 320.0),
        Pose::new(keypoints),
        0.9,
        track_id,
    )
}

fn bench_filter_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_pipeline");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(1));

    group.bench_function("process_frame_single_track", |b| {
        let mut pipeline = FilterPipeline::new(FilterPipelineConfig::default());
        let mut frame = 0u64;
        b.iter(|| {
            frame += 1;
            let out = pipeline.process_frame(
                frame,
                1920,
                1080,
                vec![black_box(make_candidate(frame, 1))],
            );
            black_box(out)
        });
    });

    group.finish();
}

fn bench_sequence_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_aggregation");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    // Four interleaved partitions with long runs each
    let errors: Vec<FrameError> = (0..4_000u64)
        .map(|i| FrameError {
            kind: if i % 2 == 0 {
                ErrorKind::Position
            } else {
                ErrorKind::Distance
            },
            part: if i % 4 < 2 {
                BodyPart::Leg(Side::Left)
            } else {
                BodyPart::Arm(Side::Right)
            },
            severity: 1.0 + (i % 10) as f64 / 10.0,
            deduction: 0.5,
            frame_index: i / 4,
            timestamp: (i / 4) as f64 / 30.0,
        })
        .collect();

    group.throughput(Throughput::Elements(errors.len() as u64));
    group.bench_function("aggregate_4k_errors", |b| {
        let aggregator = SequenceAggregator::new(SequenceConfig::default());
        b.iter(|| black_box(aggregator.aggregate(black_box(&errors))));
    });

    group.finish();
}

criterion_group!(benches, bench_filter_pipeline, bench_sequence_aggregation);
criterion_main!(benches);
