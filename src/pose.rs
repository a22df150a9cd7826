use crate::{error::Error, geometry::Point};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub const ALL: [KeypointKind; NUM_KEYPOINTS] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::KeypointVariantToUSize(self))
    }

    pub fn from_idx(idx: usize) -> Result<Self, Error> {
        Self::from_usize(idx).ok_or(Error::ConvertUSizeToKeypointKind(idx))
    }

    /// The label the detector attaches to this landmark.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

/// A named landmark as reported by the detector. Coordinates are image-space pixels with the
/// origin at the top left, so `y` grows downward.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Keypoint {
    pub fn new(kind: KeypointKind, x: f32, y: f32, score: f32) -> Self {
        Self {
            name: Some(kind.name().to_owned()),
            x,
            y,
            score: Some(score),
        }
    }

    #[inline]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Detector confidence, with a missing score counted as zero.
    #[inline]
    pub fn confidence(&self) -> f32 {
        self.score.unwrap_or(0.0)
    }

    pub fn kind(&self) -> Option<KeypointKind> {
        self.name.as_deref().and_then(KeypointKind::from_name)
    }

    pub fn project(&self) -> ProjectedKeypoint {
        ProjectedKeypoint {
            part: self
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(constants::UNKNOWN_PART)
                .to_owned(),
            position: Position {
                x: self.x,
                y: self.y,
            },
            score: self.confidence(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A keypoint as echoed back alongside an evaluation, for renderers and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedKeypoint {
    pub part: String,
    pub position: Position,
    pub score: f32,
}

/// First keypoint whose name matches exactly.
pub fn by_name<'a>(keypoints: &'a [Keypoint], name: &str) -> Option<&'a Keypoint> {
    keypoints
        .iter()
        .find(|keypoint| keypoint.name.as_deref() == Some(name))
}

#[inline]
pub fn by_kind(keypoints: &[Keypoint], kind: KeypointKind) -> Option<&Keypoint> {
    by_name(keypoints, kind.name())
}

pub fn project_all(keypoints: &[Keypoint]) -> Vec<ProjectedKeypoint> {
    keypoints.iter().map(Keypoint::project).collect()
}

pub mod constants {
    /// Minimum detector confidence for a keypoint to be usable by a criterion.
    pub const MIN_VISIBLE_SCORE: f32 = 0.5;

    pub const UNKNOWN_PART: &str = "unknown";
}

#[cfg(test)]
mod tests {
    use super::*;

    mod keypoint_kind_tests {
        use super::*;

        #[test]
        fn all_is_in_index_order() {
            for (i, kind) in KeypointKind::ALL.iter().enumerate() {
                assert_eq!(kind.idx().unwrap(), i);
                assert_eq!(KeypointKind::from_idx(i).unwrap(), *kind);
            }
        }

        #[test]
        fn out_of_range_index() {
            assert!(matches!(
                KeypointKind::from_idx(NUM_KEYPOINTS),
                Err(Error::ConvertUSizeToKeypointKind(17))
            ));
        }

        #[test]
        fn names_round_trip() {
            assert_eq!(KeypointKind::RightWrist.name(), "right_wrist");
            assert_eq!(
                KeypointKind::from_name("left_hip"),
                Some(KeypointKind::LeftHip)
            );
            assert_eq!(KeypointKind::from_name("Left_Hip"), None);
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn first_match_wins() {
            let keypoints = vec![
                Keypoint::new(KeypointKind::Nose, 1.0, 1.0, 0.9),
                Keypoint::new(KeypointKind::LeftEye, 2.0, 2.0, 0.9),
                Keypoint::new(KeypointKind::Nose, 3.0, 3.0, 0.1),
            ];
            let nose = by_name(&keypoints, "nose").unwrap();
            assert_eq!(nose.x, 1.0);
            assert_eq!(nose.confidence(), 0.9);
        }

        #[test]
        fn missing_is_none() {
            let keypoints = vec![Keypoint::new(KeypointKind::Nose, 1.0, 1.0, 0.9)];
            assert!(by_name(&keypoints, "NOSE").is_none());
            assert!(by_kind(&keypoints, KeypointKind::LeftAnkle).is_none());
            assert!(by_name(&[], "nose").is_none());
        }

        #[test]
        fn unnamed_keypoints_never_match() {
            let keypoints = vec![Keypoint {
                name: None,
                x: 0.0,
                y: 0.0,
                score: Some(1.0),
            }];
            assert!(by_name(&keypoints, "").is_none());
        }
    }

    mod projection_tests {
        use super::*;

        #[test]
        fn defaults_missing_fields() {
            let keypoints = vec![
                Keypoint {
                    name: None,
                    x: 4.0,
                    y: 5.0,
                    score: None,
                },
                Keypoint::new(KeypointKind::LeftKnee, 6.0, 7.0, 0.75),
                Keypoint {
                    name: Some(String::new()),
                    x: 1.0,
                    y: 2.0,
                    score: Some(0.9),
                },
            ];
            let projected = project_all(&keypoints);
            assert_eq!(projected.len(), 3);
            assert_eq!(projected[0].part, "unknown");
            assert_eq!(projected[0].position, Position { x: 4.0, y: 5.0 });
            assert_eq!(projected[0].score, 0.0);
            assert_eq!(projected[1].part, "left_knee");
            assert_eq!(projected[1].score, 0.75);
            assert_eq!(projected[2].part, "unknown");
            assert_eq!(projected[2].score, 0.9);
        }

        #[test]
        fn deserializes_detector_output() {
            let keypoints: Vec<Keypoint> = serde_json::from_str(
                r#"[{"name": "nose", "x": 1.5, "y": 2.5, "score": 0.8}, {"x": 3, "y": 4}]"#,
            )
            .unwrap();
            assert_eq!(keypoints[0].kind(), Some(KeypointKind::Nose));
            assert_eq!(keypoints[1].name, None);
            assert_eq!(keypoints[1].score, None);
        }
    }
}
