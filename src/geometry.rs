use crate::pose::Keypoint;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn squared_distance(self, other: Self) -> f32 {
        let delta = other - self;
        delta.dot(delta)
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Bearing of this point seen from the origin, in radians.
    #[inline]
    fn bearing(self) -> f32 {
        self.y.atan2(self.x)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

pub fn distance(a: Point, b: Point) -> f32 {
    a.squared_distance(b).sqrt()
}

/// Interior angle at `vertex` between the rays to `a` and `b`, in degrees within `[0, 180]`.
///
/// Reflex angles are folded back, so a bend and its mirror image measure the same.
pub fn angle_at_vertex(a: Point, vertex: Point, b: Point) -> f32 {
    let radians = (b - vertex).bearing() - (a - vertex).bearing();
    let angle = radians.to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Whether a keypoint exists and its confidence reaches `min_score` (inclusive).
pub fn is_visible(keypoint: Option<&Keypoint>, min_score: f32) -> bool {
    keypoint.map_or(false, |keypoint| keypoint.confidence() >= min_score)
}

pub fn are_all_visible(keypoints: &[Option<&Keypoint>], min_score: f32) -> bool {
    keypoints
        .iter()
        .all(|&keypoint| is_visible(keypoint, min_score))
}

#[inline]
pub fn vertical_alignment(a: Point, b: Point) -> f32 {
    (a.y - b.y).abs()
}

#[inline]
pub fn horizontal_alignment(a: Point, b: Point) -> f32 {
    (a.x - b.x).abs()
}

/// Tilt measure, 0 for perfectly level. A zero horizontal span is treated as the worst case.
pub fn alignment_ratio(vertical_diff: f32, horizontal_distance: f32) -> f32 {
    if horizontal_distance == 0.0 {
        1.0
    } else {
        vertical_diff / horizontal_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Keypoint, KeypointKind};
    use assert_approx_eq::assert_approx_eq;

    const EPS: f32 = 1e-4;

    mod distance_tests {
        use super::*;

        #[test]
        fn three_four_five() {
            assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        }

        #[test]
        fn same_point() {
            let p = Point::new(10.0, 10.0);
            assert_eq!(distance(p, p), 0.0);
        }

        #[test]
        fn symmetric() {
            let a = Point::new(-12.5, 40.0);
            let b = Point::new(7.0, -3.25);
            assert_eq!(distance(a, b), distance(b, a));
            assert!(distance(a, b) > 0.0);
        }
    }

    mod angle_tests {
        use super::*;

        #[test]
        fn right_angle() {
            let angle = angle_at_vertex(
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            );
            assert_approx_eq!(angle, 90.0, EPS);
        }

        #[test]
        fn straight_line() {
            let angle = angle_at_vertex(
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
            );
            assert_approx_eq!(angle, 180.0, EPS);
        }

        #[test]
        fn collinear_diagonal() {
            let angle = angle_at_vertex(
                Point::new(-3.0, -3.0),
                Point::new(1.0, 1.0),
                Point::new(5.0, 5.0),
            );
            assert_approx_eq!(angle, 180.0, EPS);
        }

        #[test]
        fn reflex_is_folded() {
            // bearings of 170 and -170 degrees differ by 340 before folding
            let vertex = Point::new(0.0, 0.0);
            let a = Point::new(170f32.to_radians().cos(), 170f32.to_radians().sin());
            let b = Point::new((-170f32).to_radians().cos(), (-170f32).to_radians().sin());
            assert_approx_eq!(angle_at_vertex(a, vertex, b), 20.0, EPS);
        }

        #[test]
        fn outer_arguments_are_interchangeable() {
            let a = Point::new(80.0, 120.0);
            let vertex = Point::new(70.0, 140.0);
            let b = Point::new(65.0, 120.0);
            assert_approx_eq!(
                angle_at_vertex(a, vertex, b),
                angle_at_vertex(b, vertex, a),
                EPS
            );
        }

        #[test]
        fn mirror_images_match() {
            let vertex = Point::new(0.0, 0.0);
            let a = Point::new(1.0, 0.0);
            let above = angle_at_vertex(a, vertex, Point::new(1.0, 1.0));
            let below = angle_at_vertex(a, vertex, Point::new(1.0, -1.0));
            assert_approx_eq!(above, below, EPS);
            assert_approx_eq!(above, 45.0, EPS);
        }
    }

    #[test]
    fn midpoint_is_mean() {
        assert_eq!(
            midpoint(Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
            Point::new(5.0, 5.0)
        );
    }

    mod visibility_tests {
        use super::*;

        fn scored(score: Option<f32>) -> Keypoint {
            Keypoint {
                name: Some(KeypointKind::Nose.name().to_owned()),
                x: 100.0,
                y: 100.0,
                score,
            }
        }

        #[test]
        fn confident_keypoint() {
            assert!(is_visible(Some(&scored(Some(0.8))), 0.5));
        }

        #[test]
        fn low_confidence_keypoint() {
            assert!(!is_visible(Some(&scored(Some(0.3))), 0.5));
        }

        #[test]
        fn boundary_is_inclusive() {
            assert!(is_visible(Some(&scored(Some(0.5))), 0.5));
        }

        #[test]
        fn missing_keypoint() {
            assert!(!is_visible(None, 0.0));
        }

        #[test]
        fn missing_score_counts_as_zero() {
            assert!(!is_visible(Some(&scored(None)), 0.5));
            assert!(is_visible(Some(&scored(None)), 0.0));
        }

        #[test]
        fn all_visible() {
            let a = scored(Some(0.8));
            let b = scored(Some(0.9));
            assert!(are_all_visible(&[Some(&a), Some(&b)], 0.5));
            assert!(!are_all_visible(&[Some(&a), None], 0.5));
            assert!(are_all_visible(&[], 0.5));
        }
    }

    mod alignment_tests {
        use super::*;

        #[test]
        fn ratio() {
            assert_approx_eq!(alignment_ratio(5.0, 100.0), 0.05);
        }

        #[test]
        fn zero_span_is_worst_case() {
            assert_eq!(alignment_ratio(5.0, 0.0), 1.0);
            assert_eq!(alignment_ratio(0.0, 0.0), 1.0);
        }

        #[test]
        fn level_is_zero() {
            assert_eq!(alignment_ratio(0.0, 42.0), 0.0);
        }

        #[test]
        fn axis_differences() {
            let a = Point::new(80.0, 100.0);
            let b = Point::new(120.0, 140.0);
            assert_eq!(vertical_alignment(a, b), 40.0);
            assert_eq!(horizontal_alignment(b, a), 40.0);
        }
    }
}
