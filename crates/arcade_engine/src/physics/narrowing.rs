//! Tiered overlap test between two entities
//!
//! Each tier runs only if the previous one passed and the configured
//! [`DetectionLevel`] asks for it:
//!
//! 1. **Coarse**: world-space axis-aligned bounds intersect.
//! 2. **Oriented**: some corner of either local rectangle, mapped through
//!    its world transform and back into the other entity's local frame,
//!    lies inside the other rectangle.
//! 3. **Exact**: no separating axis exists along either rectangle's local
//!    axes.
//!
//! The intersection rectangle from the coarse tier is what gets reported,
//! whichever tier confirms the collision.

use crate::foundation::math::{Point2, Rect};
use crate::scene::Entity;
use serde::{Deserialize, Serialize};

/// Precision of collision detection, in increasing cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionLevel {
    /// World-space axis-aligned bounds only
    Coarse,
    /// Oriented rectangle corner containment
    Oriented,
    /// Separating-axis test on the oriented rectangles
    #[default]
    Exact,
}

/// Why a pair was refused without running the geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Both sides are the same entity
    SelfPair,
    /// A world transform could not be inverted
    SingularTransform,
}

/// Result of testing one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The pair collides; carries the world-space bounds intersection
    Overlapping(Rect),
    /// The given tier proved the pair apart
    Separated(DetectionLevel),
    /// The pair could not be tested and counts as not colliding
    Rejected(RejectReason),
}

impl Outcome {
    /// Intersection rectangle if the pair collides
    pub fn intersection(&self) -> Option<Rect> {
        match self {
            Outcome::Overlapping(rect) => Some(*rect),
            _ => None,
        }
    }

    /// Whether the pair collides
    pub fn is_collision(&self) -> bool {
        matches!(self, Outcome::Overlapping(_))
    }
}

/// Corners of both rectangles, each expressed in the other's local frame
struct CornerSets {
    /// Corners of `a`, in `b`'s local frame
    a_in_b: [Point2; 4],
    /// Corners of `b`, in `a`'s local frame
    b_in_a: [Point2; 4],
}

/// Narrow-phase tester configured for one detection level
#[derive(Debug, Clone, Copy)]
pub struct NarrowPhase {
    level: DetectionLevel,
}

impl NarrowPhase {
    /// Create a tester for `level`
    pub fn new(level: DetectionLevel) -> Self {
        Self { level }
    }

    /// Configured level
    pub fn level(&self) -> DetectionLevel {
        self.level
    }

    /// Test two entities for overlap
    pub fn test(&self, a: &dyn Entity, b: &dyn Entity) -> Outcome {
        if std::ptr::addr_eq(a, b) {
            log::error!("Collision test of {:?} against itself; this should be unreachable", a.kind());
            return Outcome::Rejected(RejectReason::SelfPair);
        }

        let Some(intersection) = a.world_bounds().intersection(&b.world_bounds()) else {
            return Outcome::Separated(DetectionLevel::Coarse);
        };
        if self.level == DetectionLevel::Coarse {
            return Outcome::Overlapping(intersection);
        }

        let a_bounds = a.local_bounds();
        let b_bounds = b.local_bounds();
        let Some(corners) = corner_sets(a, &a_bounds, b, &b_bounds) else {
            return Outcome::Rejected(RejectReason::SingularTransform);
        };

        let contained = any_contained(&b_bounds, &corners.a_in_b) || any_contained(&a_bounds, &corners.b_in_a);
        if !contained {
            return Outcome::Separated(DetectionLevel::Oriented);
        }
        if self.level == DetectionLevel::Oriented {
            return Outcome::Overlapping(intersection);
        }

        if has_separating_axis(&b_bounds, &corners.a_in_b) || has_separating_axis(&a_bounds, &corners.b_in_a) {
            return Outcome::Separated(DetectionLevel::Exact);
        }
        Outcome::Overlapping(intersection)
    }
}

/// Test two entities at `level`, returning the intersection if they collide
pub fn collide(level: DetectionLevel, a: &dyn Entity, b: &dyn Entity) -> Option<Rect> {
    NarrowPhase::new(level).test(a, b).intersection()
}

fn corner_sets(a: &dyn Entity, a_bounds: &Rect, b: &dyn Entity, b_bounds: &Rect) -> Option<CornerSets> {
    let a_transform = a.world_transform();
    let b_transform = b.world_transform();

    let (Some(a_inverse), Some(b_inverse)) = (a_transform.inverse(), b_transform.inverse()) else {
        log::warn!(
            "Non-invertible world transform while testing {:?} against {:?}; treating as no collision",
            a.kind(),
            b.kind()
        );
        return None;
    };

    let a_to_b = b_inverse.combine(&a_transform);
    let b_to_a = a_inverse.combine(&b_transform);

    Some(CornerSets {
        a_in_b: a_bounds.corners().map(|corner| a_to_b.transform_point(corner)),
        b_in_a: b_bounds.corners().map(|corner| b_to_a.transform_point(corner)),
    })
}

fn any_contained(bounds: &Rect, points: &[Point2; 4]) -> bool {
    points.iter().any(|&point| bounds.contains(point))
}

/// True if all points lie strictly beyond one edge of `bounds`
fn has_separating_axis(bounds: &Rect, points: &[Point2; 4]) -> bool {
    let all = |predicate: fn(&Point2, &Rect) -> bool| points.iter().all(|point| predicate(point, bounds));

    all(|p, r| p.x < r.left)
        || all(|p, r| p.x > r.right())
        || all(|p, r| p.y < r.top)
        || all(|p, r| p.y > r.bottom())
}
