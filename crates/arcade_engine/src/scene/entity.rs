//! Entity capability contract
//!
//! Everything the collision code needs from an entity lives here: its local
//! footprint, its composed world transform, and a runtime [`Kind`] used to
//! route collisions to typed handlers.

use crate::foundation::math::{Rect, Transform, Vec2};
use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime identity of a concrete entity type
///
/// Ordering and hashing use only the `TypeId`; the name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct Kind {
    id: TypeId,
    name: &'static str,
}

impl Kind {
    /// Kind of the concrete type `T`
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Type name, for diagnostics only
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Kind {}

impl PartialOrd for Kind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Kind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Kind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind({})", self.name)
    }
}

/// Upcasting helpers, implemented for every `'static` type
///
/// Call these through `&dyn Entity` or `&dyn System`, never on a box directly,
/// or the box itself becomes the receiver. The same applies to `&self`
/// methods on a `&mut dyn Entity`: write `(*entity).kind()`.
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Concrete kind of the value
    fn kind(&self) -> Kind;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> Kind {
        Kind::of::<T>()
    }
}

/// Position, rotation, scale and origin of an entity relative to its parent
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position relative to the parent
    pub position: Vec2,

    /// Rotation in degrees
    pub rotation: f32,

    /// Scale factors
    pub scale: Vec2,

    /// Local point that `position`, rotation and scale are applied around
    pub origin: Vec2,

    parent_transform: Transform,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            origin: Vec2::zeros(),
            parent_transform: Transform::identity(),
        }
    }
}

impl Node {
    /// Node placed at `position`
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder: set the origin
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Builder: set the rotation in degrees
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Builder: set the scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Set the position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Offset the position
    pub fn move_by(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Set the rotation in degrees, wrapped to `[0, 360)`
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees.rem_euclid(360.0);
    }

    /// Add to the rotation in degrees
    pub fn rotate_by(&mut self, degrees: f32) {
        self.set_rotation(self.rotation + degrees);
    }

    /// Set the scale
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Set the origin
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Transform from local space to parent space
    pub fn local_transform(&self) -> Transform {
        Transform::translation(self.position)
            .combine(&Transform::rotation_degrees(self.rotation))
            .combine(&Transform::scaling(self.scale))
            .combine(&Transform::translation(-self.origin))
    }

    /// Accumulated transform of all ancestors, as last written by the scene
    pub fn parent_transform(&self) -> &Transform {
        &self.parent_transform
    }

    pub(crate) fn set_parent_transform(&mut self, transform: Transform) {
        self.parent_transform = transform;
    }

    /// Transform from local space to world space
    pub fn world_transform(&self) -> Transform {
        self.parent_transform.combine(&self.local_transform())
    }
}

/// An object living in a [`Scene`](super::Scene)
///
/// Implementors supply a [`Node`] and their local footprint; world-space
/// queries default to composing the two.
pub trait Entity: AsAny {
    /// Transform node
    fn node(&self) -> &Node;

    /// Mutable transform node
    fn node_mut(&mut self) -> &mut Node;

    /// Untransformed footprint in local space
    fn local_bounds(&self) -> Rect {
        Rect::default()
    }

    /// Full local-to-world transform
    fn world_transform(&self) -> Transform {
        self.node().world_transform()
    }

    /// Axis-aligned bounds in world space
    fn world_bounds(&self) -> Rect {
        self.world_transform().transform_rect(&self.local_bounds())
    }
}
