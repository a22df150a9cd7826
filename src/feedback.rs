//! Classification results and their human-readable rendering.
//!
//! Strategies only decide *what* was found: which criterion, which band and which way the user
//! should correct. Turning that into text is a pure lookup done here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity band assigned to a criterion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Criterion {
    ShoulderAlignment,
    /// Both elbows reported as one item.
    Elbows,
    Elbow(Side),
    WristHeight,
    Visibility,
    /// Shoulder line as judged by the general physique check.
    ShoulderLevel,
    ElbowPosition,
    /// Hip line level.
    CoreStability,
    /// Ankle spread against shoulder width.
    StanceWidth,
    BodyVisibility,
}

impl Criterion {
    pub fn title(self) -> &'static str {
        match self {
            Self::ShoulderAlignment => "Shoulders",
            Self::Elbows => "Elbows",
            Self::Elbow(Side::Left) => "Left Elbow",
            Self::Elbow(Side::Right) => "Right Elbow",
            Self::WristHeight => "Wrist Height",
            Self::Visibility => "Visibility",
            Self::ShoulderLevel => "Shoulder Alignment",
            Self::ElbowPosition => "Elbow Position",
            Self::CoreStability => "Core Stability",
            Self::StanceWidth => "Stance Width",
            Self::BodyVisibility => "Body Visibility",
        }
    }
}

/// Which way the user should move to improve a criterion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The named shoulder sits lower in the frame.
    RaiseSide(Side),
    Raise,
    Lower,
    /// Widen the elbow angle.
    Open,
    /// Narrow the elbow angle.
    Close,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Finding {
    pub criterion: Criterion,
    pub status: Status,
    pub direction: Option<Direction>,
    /// Measured elbow angle in degrees, for elbow criteria reported per side.
    pub angle: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub title: String,
    pub description: String,
    pub status: Status,
}

impl Finding {
    pub fn new(criterion: Criterion, status: Status) -> Self {
        Self {
            criterion,
            status,
            direction: None,
            angle: None,
        }
    }

    pub fn with_direction(mut self, direction: Option<Direction>) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn describe(&self) -> FeedbackItem {
        FeedbackItem {
            title: self.criterion.title().to_owned(),
            description: self.description(),
            status: self.status,
        }
    }

    fn description(&self) -> String {
        use Criterion::*;
        use Direction::*;
        use Status::*;

        match (self.criterion, self.status, self.direction) {
            (ShoulderAlignment, Success, _) => "Excellent! Your shoulders are level.".to_owned(),
            (ShoulderAlignment, Warning, Some(RaiseSide(side))) => format!(
                "Good alignment. Raise your {} shoulder slightly to level it with the {}.",
                side.label(),
                side.opposite().label()
            ),
            (ShoulderAlignment, Error, Some(RaiseSide(side))) => format!(
                "Your shoulders are uneven. Raise your {} shoulder to match the {}.",
                side.label(),
                side.opposite().label()
            ),
            (ShoulderAlignment, Warning, _) => {
                "Good alignment. Try to level your shoulders a little more.".to_owned()
            }
            (ShoulderAlignment, Error, _) => {
                "Your shoulders are uneven. Keep both at the same height.".to_owned()
            }

            (Elbows, Success, _) => {
                "Perfect! Both elbows are bent close to 90°, ideal for showing the biceps."
                    .to_owned()
            }
            (Elbows, Warning, Some(Open)) => {
                "Both elbows are slightly too closed. Open your arms toward 90°.".to_owned()
            }
            (Elbows, Warning, _) => {
                "Both elbows are slightly too open. Flex your arms toward 90°.".to_owned()
            }
            (Elbows, Error, Some(Open)) => {
                "Both elbows are far too closed. Open your arms to 90°.".to_owned()
            }
            (Elbows, Error, _) => {
                "Both elbows are far too open. Flex your arms to 90°.".to_owned()
            }

            (Elbow(side), status, direction) => {
                elbow_description(side, status, direction, self.angle)
            }

            (WristHeight, Success, _) => {
                "Excellent! Your wrists are level with your shoulders.".to_owned()
            }
            (WristHeight, Warning, Some(Lower)) => {
                "Good position. Lower your wrists slightly to shoulder level.".to_owned()
            }
            (WristHeight, Warning, _) => {
                "Good position. Raise your wrists slightly to shoulder level.".to_owned()
            }
            (WristHeight, Error, Some(Lower)) => {
                "Your wrists are too high. Bring them down to shoulder height.".to_owned()
            }
            (WristHeight, Error, Some(Raise)) => {
                "Your wrists are too low. Bring them up to shoulder height.".to_owned()
            }
            (WristHeight, Error, _) => "Position your wrists at shoulder height.".to_owned(),

            (Visibility, Success, _) => {
                "Perfect! All key body parts are visible for analysis.".to_owned()
            }
            (Visibility, Warning, _) => {
                "Good visibility. Improve the lighting and camera angle.".to_owned()
            }
            (Visibility, Error, _) => {
                "Hard to detect your body. Improve the lighting and your position in the frame."
                    .to_owned()
            }

            (ShoulderLevel, Success, _) => {
                "Excellent! Your shoulders are level and well aligned.".to_owned()
            }
            (ShoulderLevel, Warning, _) => {
                "Good shoulder alignment. Try to keep them perfectly level.".to_owned()
            }
            (ShoulderLevel, Error, _) => {
                "Your shoulders are uneven. Keep both at the same height.".to_owned()
            }

            (ElbowPosition, Success, _) => {
                "Great elbow position. Keep your arms engaged.".to_owned()
            }
            (ElbowPosition, _, _) => {
                "Lift your elbows higher to separate your arms from your torso.".to_owned()
            }

            (CoreStability, Success, _) => {
                "Excellent core control! Your hips are level and stable.".to_owned()
            }
            (CoreStability, _, _) => {
                "Keep your hips level. Brace your core a little more.".to_owned()
            }

            (StanceWidth, Success, _) => "Perfect stance width for balance.".to_owned(),
            (StanceWidth, _, _) => {
                "Set your feet about shoulder-width apart for better balance.".to_owned()
            }

            (BodyVisibility, Success, _) => {
                "Excellent! Every key body part is clearly visible.".to_owned()
            }
            (BodyVisibility, _, _) => {
                "Most of your body is visible. Improve the lighting and camera angle.".to_owned()
            }
        }
    }
}

fn elbow_description(
    side: Side,
    status: Status,
    direction: Option<Direction>,
    angle: Option<f32>,
) -> String {
    let side = side.label();
    let angle = angle.map_or_else(|| "unknown".to_owned(), |angle| format!("{}°", angle.round()));
    match (status, direction) {
        (Status::Success, _) => format!(
            "Perfect! Your {} elbow is at {}, ideal for showing the biceps.",
            side, angle
        ),
        (Status::Warning, Some(Direction::Close)) => format!(
            "Your {} elbow is at {}. Flex it slightly toward 90°.",
            side, angle
        ),
        (Status::Warning, _) => format!(
            "Your {} elbow is at {}. Open it slightly toward 90°.",
            side, angle
        ),
        (Status::Error, Some(Direction::Close)) => format!(
            "Your {} elbow is at {}, too open. Flex your arm to 90°.",
            side, angle
        ),
        (Status::Error, _) => format!(
            "Your {} elbow is at {}, too closed. Open your arm to 90°.",
            side, angle
        ),
    }
}

impl From<&Finding> for FeedbackItem {
    fn from(finding: &Finding) -> Self {
        finding.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Status::Warning).unwrap(),
            r#""warning""#
        );
        assert_eq!(
            serde_json::from_str::<Status>(r#""error""#).unwrap(),
            Status::Error
        );
    }

    #[test]
    fn titles() {
        assert_eq!(Criterion::ShoulderAlignment.title(), "Shoulders");
        assert_eq!(Criterion::Elbow(Side::Right).title(), "Right Elbow");
        assert_eq!(Criterion::Visibility.title(), "Visibility");
    }

    #[test]
    fn shoulder_direction_names_the_lower_side() {
        let item = Finding::new(Criterion::ShoulderAlignment, Status::Error)
            .with_direction(Some(Direction::RaiseSide(Side::Right)))
            .describe();
        assert_eq!(item.title, "Shoulders");
        assert_eq!(item.status, Status::Error);
        assert!(item.description.contains("Raise your right shoulder"));
        assert!(item.description.contains("match the left"));
    }

    #[test]
    fn elbow_quotes_rounded_angle() {
        let item = Finding::new(Criterion::Elbow(Side::Left), Status::Warning)
            .with_direction(Some(Direction::Close))
            .with_angle(112.6)
            .describe();
        assert_eq!(item.title, "Left Elbow");
        assert!(item.description.contains("113°"));
        assert!(item.description.contains("Flex"));
    }

    #[test]
    fn wrist_direction() {
        let raise = Finding::new(Criterion::WristHeight, Status::Error)
            .with_direction(Some(Direction::Raise))
            .describe();
        let lower = Finding::new(Criterion::WristHeight, Status::Error)
            .with_direction(Some(Direction::Lower))
            .describe();
        assert!(raise.description.contains("too low"));
        assert!(lower.description.contains("too high"));
    }

    #[test]
    fn general_physique_titles() {
        assert_eq!(Criterion::ShoulderLevel.title(), "Shoulder Alignment");
        assert_eq!(Criterion::CoreStability.title(), "Core Stability");
        assert_eq!(Criterion::StanceWidth.title(), "Stance Width");
        assert_eq!(Criterion::BodyVisibility.title(), "Body Visibility");

        let item = Finding::new(Criterion::ElbowPosition, Status::Warning)
            .with_direction(Some(Direction::Raise))
            .describe();
        assert_eq!(item.title, "Elbow Position");
        assert!(item.description.contains("Lift your elbows"));
    }

    #[test]
    fn rendering_is_pure() {
        let finding = Finding::new(Criterion::Elbows, Status::Warning)
            .with_direction(Some(Direction::Open));
        assert_eq!(finding.describe(), FeedbackItem::from(&finding));
    }
}
