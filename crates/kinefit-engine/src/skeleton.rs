//! Skeleton measurements derived from a single pose.
//!
//! All measurements require minimum keypoint confidence and return `None`
//! when the pose cannot support them; callers treat that as "check not
//! applicable", never as an error.

use kinefit_models::keypoint::{Keypoint, KeypointIndex, Pose};
use kinefit_models::Side;

/// Anchor point for a left/right keypoint pair: the midpoint when both sides
/// are confident, degrading to the single confident side.
fn pair_anchor(pose: &Pose, left: KeypointIndex, right: KeypointIndex, min_conf: f64) -> Option<Keypoint> {
    let l = pose.get(left);
    let r = pose.get(right);
    match (l.is_confident(min_conf), r.is_confident(min_conf)) {
        (true, true) => Some(Keypoint::midpoint(l, r)),
        (true, false) => Some(*l),
        (false, true) => Some(*r),
        (false, false) => None,
    }
}

/// Torso length: shoulder center to hip center.
pub fn torso_length(pose: &Pose, min_conf: f64) -> Option<f64> {
    let shoulders = pair_anchor(
        pose,
        KeypointIndex::LeftShoulder,
        KeypointIndex::RightShoulder,
        min_conf,
    )?;
    let hips = pair_anchor(pose, KeypointIndex::LeftHip, KeypointIndex::RightHip, min_conf)?;
    Some(shoulders.distance_to(&hips))
}

/// Leg length: hip to ankle, averaged over whichever sides are confident.
pub fn leg_length(pose: &Pose, min_conf: f64) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0;

    for (hip, ankle) in [
        (KeypointIndex::LeftHip, KeypointIndex::LeftAnkle),
        (KeypointIndex::RightHip, KeypointIndex::RightAnkle),
    ] {
        let h = pose.get(hip);
        let a = pose.get(ankle);
        if h.is_confident(min_conf) && a.is_confident(min_conf) {
            sum += h.distance_to(a);
            count += 1;
        }
    }

    (count > 0).then(|| sum / count as f64)
}

/// Arm length for one side: shoulder→elbow plus elbow→wrist.
pub fn arm_length(pose: &Pose, side: Side, min_conf: f64) -> Option<f64> {
    let (shoulder, elbow, wrist) = match side {
        Side::Left => (
            KeypointIndex::LeftShoulder,
            KeypointIndex::LeftElbow,
            KeypointIndex::LeftWrist,
        ),
        Side::Right => (
            KeypointIndex::RightShoulder,
            KeypointIndex::RightElbow,
            KeypointIndex::RightWrist,
        ),
    };

    let s = pose.get(shoulder);
    let e = pose.get(elbow);
    let w = pose.get(wrist);

    (s.is_confident(min_conf) && e.is_confident(min_conf) && w.is_confident(min_conf))
        .then(|| s.distance_to(e) + e.distance_to(w))
}

/// Estimated person height: vertical extent of the confident keypoints.
pub fn person_height(pose: &Pose, min_conf: f64) -> Option<f64> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for kp in &pose.keypoints {
        if kp.is_confident(min_conf) {
            min_y = min_y.min(kp.y);
            max_y = max_y.max(kp.y);
        }
    }

    let extent = max_y - min_y;
    (extent.is_finite() && extent > 0.0).then_some(extent)
}

/// Head offset above the shoulder line, normalized by person height.
///
/// Positive when the nose sits above the shoulder line (the usual case in
/// image coordinates where y grows downward).
pub fn head_offset_ratio(pose: &Pose, min_conf: f64) -> Option<f64> {
    let nose = pose.get(KeypointIndex::Nose);
    if !nose.is_confident(min_conf) {
        return None;
    }
    let shoulders = pair_anchor(
        pose,
        KeypointIndex::LeftShoulder,
        KeypointIndex::RightShoulder,
        min_conf,
    )?;
    let height = person_height(pose, min_conf)?;
    Some((shoulders.y - nose.y) / height)
}

/// Left/right vertical symmetry score over the six paired joints, in [0, 1].
///
/// Each pair contributes `1 − |Δy| / person_height`; pairs with a missing
/// side are skipped. Returns `None` when no pair is measurable.
pub fn symmetry_score(pose: &Pose, min_conf: f64) -> Option<f64> {
    const PAIRS: [(KeypointIndex, KeypointIndex); 6] = [
        (KeypointIndex::LeftShoulder, KeypointIndex::RightShoulder),
        (KeypointIndex::LeftElbow, KeypointIndex::RightElbow),
        (KeypointIndex::LeftWrist, KeypointIndex::RightWrist),
        (KeypointIndex::LeftHip, KeypointIndex::RightHip),
        (KeypointIndex::LeftKnee, KeypointIndex::RightKnee),
        (KeypointIndex::LeftAnkle, KeypointIndex::RightAnkle),
    ];

    let height = person_height(pose, min_conf)?;
    let mut total = 0.0;
    let mut count = 0;

    for (left, right) in PAIRS {
        let l = pose.get(left);
        let r = pose.get(right);
        if l.is_confident(min_conf) && r.is_confident(min_conf) {
            let penalty = ((l.y - r.y).abs() / height).min(1.0);
            total += 1.0 - penalty;
            count += 1;
        }
    }

    (count > 0).then(|| total / count as f64)
}


#[cfg(test)]
mod tests {
    use super::test_support::standing_pose;
    use super::*;

    #[test]
    fn test_torso_length_upright() {
        let pose = standing_pose(100.0, 50.0, 1.0, 0.9);
        // Shoulder center (100, 80) to hip center (100, 160)
        let torso = torso_length(&pose, 0.3).unwrap();
        assert!((torso - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_torso_degrades_to_single_side() {
        let mut pose = standing_pose(100.0, 50.0, 1.0, 0.9);
        pose.keypoints[KeypointIndex::RightShoulder as usize].confidence = 0.0;
        pose.keypoints[KeypointIndex::RightHip as usize].confidence = 0.0;
        // Left shoulder (80, 80) to left hip (85, 160)
        let torso = torso_length(&pose, 0.3).unwrap();
        let expected = ((85.0f64 - 80.0).powi(2) + (160.0f64 - 80.0).powi(2)).sqrt();
        assert!((torso - expected).abs() < 1e-9);
    }

    #[test]
    fn test_torso_unmeasurable_without_hips() {
        let mut pose = standing_pose(100.0, 50.0, 1.0, 0.9);
        pose.keypoints[KeypointIndex::LeftHip as usize].confidence = 0.0;
        pose.keypoints[KeypointIndex::RightHip as usize].confidence = 0.0;
        assert!(torso_length(&pose, 0.3).is_none());
    }

    #[test]
    fn test_symmetry_perfect_for_level_pose() {
        let pose = standing_pose(100.0, 50.0, 1.0, 0.9);
        let score = symmetry_score(&pose, 0.3).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetry_drops_for_skewed_pose() {
        let mut pose = standing_pose(100.0, 50.0, 1.0, 0.9);
        let height = person_height(&pose, 0.3).unwrap();
        // Pull every right-side joint far down. The shift also stretches the
        // measured person height, so the expected score is H / (H + s).
        let shift = height * 0.8;
        for idx in [
            KeypointIndex::RightShoulder,
            KeypointIndex::RightElbow,
            KeypointIndex::RightWrist,
            KeypointIndex::RightHip,
            KeypointIndex::RightKnee,
            KeypointIndex::RightAnkle,
        ] {
            pose.keypoints[idx as usize].y += shift;
        }
        let score = symmetry_score(&pose, 0.3).unwrap();
        let expected = height / (height + shift);
        assert!((score - expected).abs() < 1e-9, "score={}", score);
        assert!(score < 0.6, "score={}", score);
    }

    #[test]
    fn test_head_offset_positive_upright() {
        let pose = standing_pose(100.0, 50.0, 1.0, 0.9);
        let offset = head_offset_ratio(&pose, 0.3).unwrap();
        assert!(offset > 0.0 && offset < 0.5, "offset={}", offset);
    }
}
