//! Math utilities and types
//!
//! Provides the 2D math types used by the scene graph and collision code.
//! Screen conventions apply: +X is right, +Y is down, and positive rotation
//! angles turn clockwise on screen.

pub use nalgebra::{Matrix3, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// 3x3 matrix type (homogeneous 2D)
pub type Mat3 = Matrix3<f32>;

/// Axis-aligned rectangle described by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge (minimum X)
    pub left: f32,
    /// Top edge (minimum Y)
    pub top: f32,
    /// Width along X
    pub width: f32,
    /// Height along Y
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Create a rectangle spanning two opposite corners, in any order
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self {
            left,
            top,
            width: a.x.max(b.x) - left,
            height: a.y.max(b.y) - top,
        }
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// True when the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Corners in order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Point2; 4] {
        [
            Point2::new(self.left, self.top),
            Point2::new(self.right(), self.top),
            Point2::new(self.right(), self.bottom()),
            Point2::new(self.left, self.bottom()),
        ]
    }

    /// Normalized `(min, max)` extents, tolerating negative sizes
    fn extents(&self) -> (Point2, Point2) {
        let (x0, x1) = (self.left, self.right());
        let (y0, y1) = (self.top, self.bottom());
        (
            Point2::new(x0.min(x1), y0.min(y1)),
            Point2::new(x0.max(x1), y0.max(y1)),
        )
    }

    /// Point containment; min edges are inclusive, max edges exclusive
    pub fn contains(&self, point: Point2) -> bool {
        let (min, max) = self.extents();
        point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
    }

    /// Overlapping region of two rectangles
    ///
    /// Returns `None` when the rectangles are disjoint or only share an edge.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let (a_min, a_max) = self.extents();
        let (b_min, b_max) = other.extents();

        let left = a_min.x.max(b_min.x);
        let top = a_min.y.max(b_min.y);
        let right = a_max.x.min(b_max.x);
        let bottom = a_max.y.min(b_max.y);

        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

/// 2D affine transform stored as a homogeneous 3x3 matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform
    pub fn identity() -> Self {
        Self { matrix: Mat3::identity() }
    }

    /// Wrap an existing homogeneous matrix
    pub fn from_matrix(matrix: Mat3) -> Self {
        Self { matrix }
    }

    /// Pure translation
    pub fn translation(offset: Vec2) -> Self {
        Self { matrix: Mat3::new_translation(&offset) }
    }

    /// Pure rotation about the origin, in degrees
    pub fn rotation_degrees(angle: f32) -> Self {
        Self { matrix: Mat3::new_rotation(utils::deg_to_rad(angle)) }
    }

    /// Pure (possibly non-uniform) scale about the origin
    pub fn scaling(factors: Vec2) -> Self {
        Self { matrix: Mat3::new_nonuniform_scaling(&factors) }
    }

    /// Underlying matrix
    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    /// Compose with another transform; `other` is applied first
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform { matrix: self.matrix * other.matrix }
    }

    /// Map a point through this transform
    pub fn transform_point(&self, point: Point2) -> Point2 {
        self.matrix.transform_point(&point)
    }

    /// Axis-aligned bounds of a rectangle after mapping its four corners
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let mapped = rect.corners().map(|corner| self.transform_point(corner));

        let mut min = mapped[0];
        let mut max = mapped[0];
        for point in &mapped[1..] {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }
        Rect::from_corners(min, max)
    }

    /// Inverse transform, or `None` if the matrix is singular
    pub fn inverse(&self) -> Option<Transform> {
        self.matrix.try_inverse().map(Transform::from_matrix)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}
