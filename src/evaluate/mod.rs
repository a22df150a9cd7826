use crate::{
    error::Error,
    feedback::{FeedbackItem, Finding, Status},
    pose::{self, Keypoint, ProjectedKeypoint},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub mod front_double_biceps;
pub mod general_physique;

pub use front_double_biceps::FrontDoubleBiceps;
pub use general_physique::GeneralPhysique;

/// A scoring strategy for one pose category.
///
/// Evaluation is total: any keypoint set, including an empty one, yields a result. Criteria whose
/// keypoints are not visible enough are skipped rather than penalized.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, keypoints: &[Keypoint]) -> Evaluation;
}

/// Verdict for one keypoint set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Rounded mean of the points awarded by every evaluated criterion, 0 when none ran.
    pub score: u8,
    pub feedback: Vec<FeedbackItem>,
    pub keypoints: Vec<ProjectedKeypoint>,
    #[serde(skip)]
    pub findings: Vec<Finding>,
    /// How many criterion counts went into `score`.
    #[serde(skip)]
    pub criteria_evaluated: u32,
}

/// Points awarded per band.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Points {
    pub(crate) success: u32,
    pub(crate) warning: u32,
    pub(crate) error: u32,
}

impl Points {
    pub(crate) fn for_status(self, status: Status) -> u32 {
        match status {
            Status::Success => self.success,
            Status::Warning => self.warning,
            Status::Error => self.error,
        }
    }
}

/// Running total of a strategy's criteria, in evaluation order.
#[derive(Debug, Default)]
pub(crate) struct Scorecard {
    findings: Vec<Finding>,
    total: u32,
    count: u32,
}

impl Scorecard {
    /// Record a finding and count it once towards the average.
    pub(crate) fn award(&mut self, finding: Finding, points: u32) {
        self.findings.push(finding);
        self.total += points;
        self.count += 1;
    }

    /// Record a finding that stands for `weight` criteria at once.
    pub(crate) fn award_weighted(&mut self, finding: Finding, points: u32, weight: u32) {
        self.findings.push(finding);
        for _ in 0..weight {
            self.total += points;
            self.count += 1;
        }
    }

    /// Report a finding without it contributing to the score.
    pub(crate) fn note(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub(crate) fn score(&self) -> u8 {
        if self.count == 0 {
            return 0;
        }
        // every award is at most 100, so the mean is too
        (f64::from(self.total) / f64::from(self.count)).round() as u8
    }

    pub(crate) fn finish(self, keypoints: &[Keypoint]) -> Evaluation {
        let score = self.score();
        Evaluation {
            score,
            feedback: self.findings.iter().map(Finding::describe).collect(),
            keypoints: pose::project_all(keypoints),
            findings: self.findings,
            criteria_evaluated: self.count,
        }
    }
}

/// Poses a user can ask to be scored on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoseCategory {
    #[serde(alias = "frontDoubleBiceps")]
    FrontDoubleBiceps,
    #[serde(alias = "latSpread")]
    LatSpread,
    #[serde(alias = "sideChest")]
    SideChest,
    #[serde(alias = "backDoubleBiceps")]
    BackDoubleBiceps,
    /// Overall stance and symmetry, for a photo of any pose.
    General,
}

impl PoseCategory {
    pub const ALL: [PoseCategory; 5] = [
        Self::FrontDoubleBiceps,
        Self::LatSpread,
        Self::SideChest,
        Self::BackDoubleBiceps,
        Self::General,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::FrontDoubleBiceps => "front-double-biceps",
            Self::LatSpread => "lat-spread",
            Self::SideChest => "side-chest",
            Self::BackDoubleBiceps => "back-double-biceps",
            Self::General => "general",
        }
    }

    fn camel_name(self) -> &'static str {
        match self {
            Self::FrontDoubleBiceps => "frontDoubleBiceps",
            Self::LatSpread => "latSpread",
            Self::SideChest => "sideChest",
            Self::BackDoubleBiceps => "backDoubleBiceps",
            Self::General => "general",
        }
    }

    /// The strategy that scores this pose, if one exists.
    pub fn evaluator(self) -> Option<Strategy> {
        match self {
            Self::FrontDoubleBiceps => Some(Strategy::FrontDoubleBiceps(FrontDoubleBiceps)),
            Self::General => Some(Strategy::GeneralPhysique(GeneralPhysique)),
            Self::LatSpread | Self::SideChest | Self::BackDoubleBiceps => None,
        }
    }

    pub fn try_evaluator(self) -> Result<Strategy, Error> {
        self.evaluator()
            .ok_or(Error::UnsupportedPoseCategory(self))
    }
}

impl Default for PoseCategory {
    fn default() -> Self {
        Self::FrontDoubleBiceps
    }
}

impl fmt::Display for PoseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PoseCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.name() == s || category.camel_name() == s)
            .ok_or_else(|| Error::UnknownPoseCategory(s.to_owned()))
    }
}

/// Every implemented strategy, dispatched statically.
#[derive(Debug, Copy, Clone)]
pub enum Strategy {
    FrontDoubleBiceps(FrontDoubleBiceps),
    GeneralPhysique(GeneralPhysique),
}

impl Evaluator for Strategy {
    fn evaluate(&self, keypoints: &[Keypoint]) -> Evaluation {
        match self {
            Self::FrontDoubleBiceps(s) => s.evaluate(keypoints),
            Self::GeneralPhysique(s) => s.evaluate(keypoints),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{Criterion, Status};

    mod scorecard_tests {
        use super::*;

        #[test]
        fn empty_scores_zero() {
            let evaluation = Scorecard::default().finish(&[]);
            assert_eq!(evaluation.score, 0);
            assert!(evaluation.feedback.is_empty());
            assert_eq!(evaluation.criteria_evaluated, 0);
        }

        #[test]
        fn mean_is_rounded_half_up() {
            let mut card = Scorecard::default();
            card.award(Finding::new(Criterion::Visibility, Status::Success), 85);
            card.award(Finding::new(Criterion::WristHeight, Status::Warning), 64);
            // 74.5
            assert_eq!(card.score(), 75);
        }

        #[test]
        fn weighted_award_counts_twice() {
            let mut card = Scorecard::default();
            card.award_weighted(Finding::new(Criterion::Elbows, Status::Success), 92, 2);
            card.award(Finding::new(Criterion::Visibility, Status::Error), 35);
            let evaluation = card.finish(&[]);
            assert_eq!(evaluation.criteria_evaluated, 3);
            assert_eq!(evaluation.feedback.len(), 2);
            // (92 + 92 + 35) / 3 = 73
            assert_eq!(evaluation.score, 73);
        }

        #[test]
        fn notes_do_not_count() {
            let mut card = Scorecard::default();
            card.note(Finding::new(Criterion::Visibility, Status::Error));
            let evaluation = card.finish(&[]);
            assert_eq!(evaluation.score, 0);
            assert_eq!(evaluation.feedback.len(), 1);
        }
    }

    mod category_tests {
        use super::*;

        #[test]
        fn parses_both_spellings() {
            assert_eq!(
                "front-double-biceps".parse::<PoseCategory>().unwrap(),
                PoseCategory::FrontDoubleBiceps
            );
            assert_eq!(
                "latSpread".parse::<PoseCategory>().unwrap(),
                PoseCategory::LatSpread
            );
            assert!(matches!(
                "crab".parse::<PoseCategory>(),
                Err(Error::UnknownPoseCategory(_))
            ));
        }

        #[test]
        fn serde_accepts_camel_case() {
            let category: PoseCategory = serde_json::from_str(r#""sideChest""#).unwrap();
            assert_eq!(category, PoseCategory::SideChest);
            assert_eq!(
                serde_json::to_string(&category).unwrap(),
                r#""side-chest""#
            );
        }

        #[test]
        fn unimplemented_poses_have_no_strategy() {
            assert!(PoseCategory::FrontDoubleBiceps.evaluator().is_some());
            assert!(PoseCategory::General.evaluator().is_some());
            for category in &PoseCategory::ALL[1..4] {
                assert!(category.evaluator().is_none());
                assert!(matches!(
                    category.try_evaluator(),
                    Err(Error::UnsupportedPoseCategory(_))
                ));
            }
        }

        #[test]
        fn strategy_dispatch_matches_direct_call() {
            let strategy = PoseCategory::default().try_evaluator().unwrap();
            assert_eq!(strategy.evaluate(&[]), FrontDoubleBiceps.evaluate(&[]));

            let keypoints = [Keypoint::new(
                crate::pose::KeypointKind::Nose,
                1.0,
                2.0,
                0.9,
            )];
            let general = PoseCategory::General.try_evaluator().unwrap();
            assert_eq!(
                general.evaluate(&keypoints),
                GeneralPhysique.evaluate(&keypoints)
            );
            assert_eq!("general".parse::<PoseCategory>().unwrap(), PoseCategory::General);
        }
    }
}
