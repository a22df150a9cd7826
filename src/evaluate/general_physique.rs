use crate::{
    evaluate::{Evaluation, Evaluator, Points, Scorecard},
    feedback::{Criterion, Direction, Finding, Status},
    geometry::{alignment_ratio, horizontal_alignment, midpoint, vertical_alignment},
    pose::{by_kind, Keypoint, KeypointKind},
};
use tracing::{debug, trace};

pub mod thresholds {
    /// A landmark is used only when its score is strictly above this.
    pub const MIN_SCORE: f32 = 0.5;

    pub const SHOULDER_SUCCESS: f32 = 0.1;
    pub const SHOULDER_WARNING: f32 = 0.2;

    pub const HIP_SUCCESS: f32 = 0.08;

    /// Ankle spread as a multiple of shoulder width, exclusive on both ends.
    pub const STANCE_RANGE: (f32, f32) = (0.8, 1.5);

    /// Fraction of confidently detected keypoints, exclusive lower bounds. Below the warning
    /// bound visibility is neither reported nor scored.
    pub const VISIBILITY_SUCCESS: f32 = 0.8;
    pub const VISIBILITY_WARNING: f32 = 0.6;
}

const SHOULDER_POINTS: Points = Points {
    success: 95,
    warning: 75,
    error: 50,
};

// the remaining criteria only ever rate success or warning
const ELBOW_POINTS: Points = Points {
    success: 92,
    warning: 70,
    error: 70,
};
const HIP_POINTS: Points = Points {
    success: 94,
    warning: 72,
    error: 72,
};
const STANCE_POINTS: Points = Points {
    success: 90,
    warning: 68,
    error: 68,
};
const VISIBILITY_POINTS: Points = Points {
    success: 88,
    warning: 65,
    error: 65,
};

/// Whole-body check run on a photo of any pose: level shoulders and hips, elbows held clear of
/// the shoulder line, a balanced stance and a well framed body.
#[derive(Debug, Copy, Clone, Default)]
pub struct GeneralPhysique;

fn confident(keypoint: Option<&Keypoint>) -> Option<&Keypoint> {
    keypoint.filter(|keypoint| keypoint.confidence() > thresholds::MIN_SCORE)
}

/// Both landmarks of a left/right pair, if each scores above the threshold.
fn confident_pair(
    keypoints: &[Keypoint],
    left: KeypointKind,
    right: KeypointKind,
) -> Option<(&Keypoint, &Keypoint)> {
    Some((
        confident(by_kind(keypoints, left))?,
        confident(by_kind(keypoints, right))?,
    ))
}

/// Both shoulders regardless of score; elbow and stance only use them as a reference line.
fn shoulders(keypoints: &[Keypoint]) -> Option<(&Keypoint, &Keypoint)> {
    Some((
        by_kind(keypoints, KeypointKind::LeftShoulder)?,
        by_kind(keypoints, KeypointKind::RightShoulder)?,
    ))
}

impl Evaluator for GeneralPhysique {
    fn evaluate(&self, keypoints: &[Keypoint]) -> Evaluation {
        let mut card = Scorecard::default();

        shoulder_level(keypoints, &mut card);
        elbow_position(keypoints, &mut card);
        core_stability(keypoints, &mut card);
        stance_width(keypoints, &mut card);
        body_visibility(keypoints, &mut card);

        let evaluation = card.finish(keypoints);
        debug!(
            score = evaluation.score,
            criteria = evaluation.criteria_evaluated,
            keypoints = keypoints.len(),
            "evaluated general physique"
        );
        evaluation
    }
}

fn shoulder_level(keypoints: &[Keypoint], card: &mut Scorecard) {
    let (left, right) = match confident_pair(
        keypoints,
        KeypointKind::LeftShoulder,
        KeypointKind::RightShoulder,
    ) {
        Some((left, right)) => (left.point(), right.point()),
        None => {
            trace!("skipping shoulder level");
            return;
        }
    };

    let ratio = alignment_ratio(
        vertical_alignment(left, right),
        horizontal_alignment(left, right),
    );
    let status = if ratio < thresholds::SHOULDER_SUCCESS {
        Status::Success
    } else if ratio < thresholds::SHOULDER_WARNING {
        Status::Warning
    } else {
        Status::Error
    };

    debug!(ratio, %status, "shoulder level");
    card.award(
        Finding::new(Criterion::ShoulderLevel, status),
        SHOULDER_POINTS.for_status(status),
    );
}

fn elbow_position(keypoints: &[Keypoint], card: &mut Scorecard) {
    let (left, right) = match confident_pair(
        keypoints,
        KeypointKind::LeftElbow,
        KeypointKind::RightElbow,
    ) {
        Some((left, right)) => (left.point(), right.point()),
        None => {
            trace!("skipping elbow position");
            return;
        }
    };

    let elbow_line = midpoint(left, right).y;
    // a shoulder line at y = 0 counts as unknown
    let shoulder_line = shoulders(keypoints)
        .map(|(left, right)| midpoint(left.point(), right.point()).y)
        .filter(|&y| y != 0.0);

    let status = match shoulder_line {
        Some(shoulder_line) if elbow_line > shoulder_line => Status::Success,
        _ => Status::Warning,
    };
    let direction = match status {
        Status::Success => None,
        _ => Some(Direction::Raise),
    };

    debug!(elbow_line, ?shoulder_line, %status, "elbow position");
    card.award(
        Finding::new(Criterion::ElbowPosition, status).with_direction(direction),
        ELBOW_POINTS.for_status(status),
    );
}

fn core_stability(keypoints: &[Keypoint], card: &mut Scorecard) {
    let (left, right) = match confident_pair(
        keypoints,
        KeypointKind::LeftHip,
        KeypointKind::RightHip,
    ) {
        Some((left, right)) => (left.point(), right.point()),
        None => {
            trace!("skipping core stability");
            return;
        }
    };

    let ratio = alignment_ratio(
        vertical_alignment(left, right),
        horizontal_alignment(left, right),
    );
    let status = if ratio < thresholds::HIP_SUCCESS {
        Status::Success
    } else {
        Status::Warning
    };

    debug!(ratio, %status, "core stability");
    card.award(
        Finding::new(Criterion::CoreStability, status),
        HIP_POINTS.for_status(status),
    );
}

fn stance_width(keypoints: &[Keypoint], card: &mut Scorecard) {
    let stance = match confident_pair(
        keypoints,
        KeypointKind::LeftAnkle,
        KeypointKind::RightAnkle,
    ) {
        Some((left, right)) => horizontal_alignment(left.point(), right.point()),
        None => {
            trace!("skipping stance width");
            return;
        }
    };

    let shoulder_width = shoulders(keypoints)
        .map(|(left, right)| horizontal_alignment(left.point(), right.point()))
        .filter(|&width| width != 0.0);

    let (narrowest, widest) = thresholds::STANCE_RANGE;
    let status = match shoulder_width {
        Some(width) if stance > width * narrowest && stance < width * widest => Status::Success,
        _ => Status::Warning,
    };

    debug!(stance, ?shoulder_width, %status, "stance width");
    card.award(
        Finding::new(Criterion::StanceWidth, status),
        STANCE_POINTS.for_status(status),
    );
}

fn body_visibility(keypoints: &[Keypoint], card: &mut Scorecard) {
    if keypoints.is_empty() {
        trace!("skipping body visibility");
        return;
    }

    let visible = keypoints
        .iter()
        .filter(|keypoint| keypoint.confidence() > thresholds::MIN_SCORE)
        .count();
    let ratio = visible as f32 / keypoints.len() as f32;

    let status = if ratio > thresholds::VISIBILITY_SUCCESS {
        Status::Success
    } else if ratio > thresholds::VISIBILITY_WARNING {
        Status::Warning
    } else {
        debug!(ratio, "body visibility too low to report");
        return;
    };

    debug!(ratio, %status, "body visibility");
    card.award(
        Finding::new(Criterion::BodyVisibility, status),
        VISIBILITY_POINTS.for_status(status),
    );
}
