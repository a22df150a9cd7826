use crate::pose::KeypointKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to convert keypoint variant to usize: {0:?}")]
    KeypointVariantToUSize(KeypointKind),

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("expected at most {0} keypoint rows from the detector, got {1}")]
    TooManyKeypointRows(usize, usize),

    #[error("failed to parse keypoints from json")]
    ParseKeypoints(#[source] serde_json::Error),

    #[error("failed to serialize evaluation to json")]
    SerializeEvaluation(#[source] serde_json::Error),

    #[error("failed to read input")]
    ReadInput(#[source] std::io::Error),

    #[error("failed to open input file: {1:?}")]
    OpenInput(#[source] std::io::Error, std::path::PathBuf),

    #[error("unknown pose category: {0}")]
    UnknownPoseCategory(String),

    #[error("no evaluation strategy for pose category: {0}")]
    UnsupportedPoseCategory(crate::evaluate::PoseCategory),

    #[error("backend {0} is not available: {1}")]
    BackendUnavailable(String, String),

    #[error("none of the {0} candidate backends are available")]
    NoBackendAvailable(usize),

    #[error("failed to initialize detector")]
    InitializeDetector(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("detector lock was poisoned")]
    PoisonedDetector,
}
