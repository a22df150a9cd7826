//! Scores bodybuilding poses from detected body keypoints.
//!
//! A detector produces named, scored landmarks for one person; an [`evaluate::Evaluator`] for
//! the chosen [`evaluate::PoseCategory`] turns them into a 0-100 score and ordered feedback.

pub mod detector;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod feedback;
pub mod geometry;
pub mod input;
pub mod pose;

pub use error::Error;
pub use evaluate::{Evaluation, Evaluator, PoseCategory};
pub use feedback::{FeedbackItem, Status};
pub use pose::Keypoint;
