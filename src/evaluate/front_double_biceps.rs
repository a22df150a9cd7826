use crate::{
    evaluate::{Evaluation, Evaluator, Points, Scorecard},
    feedback::{Criterion, Direction, Finding, Side, Status},
    geometry::{
        alignment_ratio, angle_at_vertex, are_all_visible, distance, midpoint,
        vertical_alignment,
    },
    pose::{by_kind, constants::MIN_VISIBLE_SCORE, Keypoint, KeypointKind},
};
use tracing::{debug, trace};

pub mod thresholds {
    /// Shoulder tilt ratio bands.
    pub const SHOULDER_SUCCESS: f32 = 0.08;
    pub const SHOULDER_WARNING: f32 = 0.15;

    /// Elbow angle bands in degrees, inclusive on both ends.
    pub const ELBOW_SUCCESS: (f32, f32) = (75.0, 105.0);
    pub const ELBOW_WARNING: (f32, f32) = (60.0, 120.0);
    pub const ELBOW_IDEAL: f32 = 90.0;

    /// Wrist-to-shoulder height relative to torso length.
    pub const WRIST_SUCCESS: f32 = 0.15;
    pub const WRIST_WARNING: f32 = 0.30;
    /// Torso length used when the shoulder-to-hip distance is unavailable.
    pub const FALLBACK_BODY_HEIGHT: f32 = 100.0;

    /// Fraction of confidently detected keypoints, exclusive lower bounds.
    pub const VISIBILITY_SUCCESS: f32 = 0.8;
    pub const VISIBILITY_WARNING: f32 = 0.6;
    /// A keypoint counts towards visibility only when strictly above this score.
    pub const VISIBILITY_SCORE: f32 = 0.5;
}

const SHOULDER_POINTS: Points = Points {
    success: 95,
    warning: 75,
    error: 50,
};
const ELBOW_POINTS: Points = Points {
    success: 92,
    warning: 70,
    error: 45,
};
const WRIST_POINTS: Points = Points {
    success: 88,
    warning: 65,
    error: 40,
};
const VISIBILITY_POINTS: Points = Points {
    success: 85,
    warning: 60,
    error: 35,
};

/// A combined elbow verdict stands for both arms.
const COMBINED_ELBOW_WEIGHT: u32 = 2;

/// Scores the front double biceps: arms raised to the sides, elbows bent at a right angle and
/// fists level with the shoulders.
#[derive(Debug, Copy, Clone, Default)]
pub struct FrontDoubleBiceps;

/// The landmarks this pose looks at, each the first match by name.
struct Joints<'a> {
    left_shoulder: Option<&'a Keypoint>,
    right_shoulder: Option<&'a Keypoint>,
    left_elbow: Option<&'a Keypoint>,
    right_elbow: Option<&'a Keypoint>,
    left_wrist: Option<&'a Keypoint>,
    right_wrist: Option<&'a Keypoint>,
    left_hip: Option<&'a Keypoint>,
}

impl<'a> Joints<'a> {
    fn locate(keypoints: &'a [Keypoint]) -> Self {
        Self {
            left_shoulder: by_kind(keypoints, KeypointKind::LeftShoulder),
            right_shoulder: by_kind(keypoints, KeypointKind::RightShoulder),
            left_elbow: by_kind(keypoints, KeypointKind::LeftElbow),
            right_elbow: by_kind(keypoints, KeypointKind::RightElbow),
            left_wrist: by_kind(keypoints, KeypointKind::LeftWrist),
            right_wrist: by_kind(keypoints, KeypointKind::RightWrist),
            left_hip: by_kind(keypoints, KeypointKind::LeftHip),
        }
    }

    /// Elbow angle for one arm, if shoulder, elbow and wrist are all visible.
    fn elbow_angle(&self, side: Side) -> Option<f32> {
        let (shoulder, elbow, wrist) = match side {
            Side::Left => (self.left_shoulder, self.left_elbow, self.left_wrist),
            Side::Right => (self.right_shoulder, self.right_elbow, self.right_wrist),
        };
        if !are_all_visible(&[shoulder, elbow, wrist], MIN_VISIBLE_SCORE) {
            return None;
        }
        let (shoulder, elbow, wrist) = (shoulder?, elbow?, wrist?);
        Some(angle_at_vertex(shoulder.point(), elbow.point(), wrist.point()))
    }
}

impl Evaluator for FrontDoubleBiceps {
    fn evaluate(&self, keypoints: &[Keypoint]) -> Evaluation {
        let joints = Joints::locate(keypoints);
        let mut card = Scorecard::default();

        shoulder_alignment(&joints, &mut card);
        elbow_angles(&joints, &mut card);
        wrist_height(&joints, &mut card);
        visibility(keypoints, &mut card);

        let evaluation = card.finish(keypoints);
        debug!(
            score = evaluation.score,
            criteria = evaluation.criteria_evaluated,
            keypoints = keypoints.len(),
            "evaluated front double biceps"
        );
        evaluation
    }
}

fn shoulder_alignment(joints: &Joints<'_>, card: &mut Scorecard) {
    if !are_all_visible(
        &[joints.left_shoulder, joints.right_shoulder],
        MIN_VISIBLE_SCORE,
    ) {
        trace!("skipping shoulder alignment");
        return;
    }
    let (left, right) = match (joints.left_shoulder, joints.right_shoulder) {
        (Some(left), Some(right)) => (left.point(), right.point()),
        _ => return,
    };

    let ratio = alignment_ratio(vertical_alignment(left, right), distance(left, right));
    let status = if ratio < thresholds::SHOULDER_SUCCESS {
        Status::Success
    } else if ratio < thresholds::SHOULDER_WARNING {
        Status::Warning
    } else {
        Status::Error
    };

    // larger y is lower in the frame
    let direction = match status {
        Status::Success => None,
        _ if left.y > right.y => Some(Direction::RaiseSide(Side::Left)),
        _ if right.y > left.y => Some(Direction::RaiseSide(Side::Right)),
        _ => None,
    };

    debug!(ratio, %status, "shoulder alignment");
    card.award(
        Finding::new(Criterion::ShoulderAlignment, status).with_direction(direction),
        SHOULDER_POINTS.for_status(status),
    );
}

fn elbow_status(angle: f32) -> Status {
    let (success_lo, success_hi) = thresholds::ELBOW_SUCCESS;
    let (warning_lo, warning_hi) = thresholds::ELBOW_WARNING;
    if (success_lo..=success_hi).contains(&angle) {
        Status::Success
    } else if (warning_lo..=warning_hi).contains(&angle) {
        Status::Warning
    } else {
        Status::Error
    }
}

fn elbow_direction(angle: f32) -> Option<Direction> {
    if angle < thresholds::ELBOW_IDEAL {
        Some(Direction::Open)
    } else if angle > thresholds::ELBOW_IDEAL {
        Some(Direction::Close)
    } else {
        None
    }
}

fn elbow_angles(joints: &Joints<'_>, card: &mut Scorecard) {
    match (
        joints.elbow_angle(Side::Left),
        joints.elbow_angle(Side::Right),
    ) {
        (Some(left), Some(right)) => both_elbows(left, right, card),
        (Some(left), None) => single_elbow(Side::Left, left, card),
        (None, Some(right)) => single_elbow(Side::Right, right, card),
        (None, None) => trace!("skipping elbow angles"),
    }
}

/// Both arms visible: agreeing arms get one combined item weighted as two criteria, otherwise
/// each arm is reported on its own.
fn both_elbows(left: f32, right: f32, card: &mut Scorecard) {
    let (success_lo, success_hi) = thresholds::ELBOW_SUCCESS;
    let (warning_lo, warning_hi) = thresholds::ELBOW_WARNING;

    let combined = if elbow_status(left) == Status::Success
        && elbow_status(right) == Status::Success
    {
        Some((Status::Success, None))
    } else if left < success_lo && right < success_lo {
        let status = if left >= warning_lo && right >= warning_lo {
            Status::Warning
        } else {
            Status::Error
        };
        Some((status, Some(Direction::Open)))
    } else if left > success_hi && right > success_hi {
        let status = if left <= warning_hi && right <= warning_hi {
            Status::Warning
        } else {
            Status::Error
        };
        Some((status, Some(Direction::Close)))
    } else {
        None
    };

    match combined {
        Some((status, direction)) => {
            debug!(left, right, %status, "combined elbow angles");
            card.award_weighted(
                Finding::new(Criterion::Elbows, status).with_direction(direction),
                ELBOW_POINTS.for_status(status),
                COMBINED_ELBOW_WEIGHT,
            );
        }
        None => {
            single_elbow(Side::Left, left, card);
            single_elbow(Side::Right, right, card);
        }
    }
}

fn single_elbow(side: Side, angle: f32, card: &mut Scorecard) {
    let status = elbow_status(angle);
    debug!(?side, angle, %status, "elbow angle");
    card.award(
        Finding::new(Criterion::Elbow(side), status)
            .with_direction(elbow_direction(angle))
            .with_angle(angle),
        ELBOW_POINTS.for_status(status),
    );
}

fn wrist_height(joints: &Joints<'_>, card: &mut Scorecard) {
    let required = [
        joints.left_wrist,
        joints.right_wrist,
        joints.left_shoulder,
        joints.right_shoulder,
    ];
    if !are_all_visible(&required, MIN_VISIBLE_SCORE) {
        trace!("skipping wrist height");
        return;
    }
    let (left_wrist, right_wrist, left_shoulder, right_shoulder) = match required {
        [Some(lw), Some(rw), Some(ls), Some(rs)] => (lw, rw, ls, rs),
        _ => return,
    };

    let shoulder_y = midpoint(left_shoulder.point(), right_shoulder.point()).y;
    let wrist_y = midpoint(left_wrist.point(), right_wrist.point()).y;
    let ratio = (wrist_y - shoulder_y).abs() / body_height(left_shoulder, joints.left_hip);

    let status = if ratio < thresholds::WRIST_SUCCESS {
        Status::Success
    } else if ratio < thresholds::WRIST_WARNING {
        Status::Warning
    } else {
        Status::Error
    };
    let direction = match status {
        Status::Success => None,
        _ if wrist_y > shoulder_y => Some(Direction::Raise),
        _ if wrist_y < shoulder_y => Some(Direction::Lower),
        _ => None,
    };

    debug!(ratio, %status, "wrist height");
    card.award(
        Finding::new(Criterion::WristHeight, status).with_direction(direction),
        WRIST_POINTS.for_status(status),
    );
}

/// Torso length used to scale vertical offsets. The hip only has to be present, not visible.
fn body_height(shoulder: &Keypoint, hip: Option<&Keypoint>) -> f32 {
    match hip.map(|hip| distance(shoulder.point(), hip.point())) {
        Some(height) if height > 0.0 => height,
        _ => thresholds::FALLBACK_BODY_HEIGHT,
    }
}

fn visibility(keypoints: &[Keypoint], card: &mut Scorecard) {
    if keypoints.is_empty() {
        // nothing to measure; report it without scoring
        card.note(Finding::new(Criterion::Visibility, Status::Error));
        return;
    }

    let visible = keypoints
        .iter()
        .filter(|keypoint| keypoint.confidence() > thresholds::VISIBILITY_SCORE)
        .count();
    let ratio = visible as f32 / keypoints.len() as f32;

    let status = if ratio > thresholds::VISIBILITY_SUCCESS {
        Status::Success
    } else if ratio > thresholds::VISIBILITY_WARNING {
        Status::Warning
    } else {
        Status::Error
    };

    debug!(ratio, %status, "visibility");
    card.award(
        Finding::new(Criterion::Visibility, status),
        VISIBILITY_POINTS.for_status(status),
    );
}
