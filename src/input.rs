use crate::{detector::decode_raw_pose, error::Error, pose::Keypoint};
use serde::Deserialize;

/// How keypoint sets are written on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    /// `{name, x, y, score}` objects, as normalized detector output.
    Named,
    /// `[y, x, score]` rows in landmark order, straight from the model.
    Raw,
}

impl Format {
    pub fn from_raw_flag(raw: bool) -> Self {
        if raw {
            Self::Raw
        } else {
            Self::Named
        }
    }
}

/// A bare list, or a pose object carrying the list under `keypoints`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document<T> {
    List(Vec<T>),
    Pose { keypoints: Vec<T> },
}

impl<T> Document<T> {
    fn into_keypoints(self) -> Vec<T> {
        match self {
            Self::List(keypoints) | Self::Pose { keypoints } => keypoints,
        }
    }
}

pub fn parse(text: &str, format: Format) -> Result<Vec<Keypoint>, Error> {
    match format {
        Format::Named => Ok(serde_json::from_str::<Document<Keypoint>>(text)
            .map_err(Error::ParseKeypoints)?
            .into_keypoints()),
        Format::Raw => decode_raw_pose(
            &serde_json::from_str::<Document<[f32; 3]>>(text)
                .map_err(Error::ParseKeypoints)?
                .into_keypoints(),
        ),
    }
}
