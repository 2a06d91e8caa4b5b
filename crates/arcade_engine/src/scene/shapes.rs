//! Built-in shape entities

use super::entity::{Entity, Node};
use crate::foundation::math::{Rect, Vec2};

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque red
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// Opaque green
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    /// Opaque blue
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    /// Opaque yellow
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    /// Fully transparent
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Opaque color from channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from channels including alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Axis-aligned rectangle in local space, starting at the local origin
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleEntity {
    /// Transform node
    pub node: Node,
    /// Width and height
    pub size: Vec2,
    /// Fill color
    pub fill: Color,
}

impl RectangleEntity {
    /// Rectangle of the given size at the origin
    pub fn new(size: Vec2) -> Self {
        Self {
            node: Node::default(),
            size,
            fill: Color::default(),
        }
    }

    /// Builder: place at `position`
    pub fn at(mut self, position: Vec2) -> Self {
        self.node.set_position(position);
        self
    }

    /// Builder: replace the node
    pub fn with_node(mut self, node: Node) -> Self {
        self.node = node;
        self
    }

    /// Builder: set the fill color
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }
}

impl Entity for RectangleEntity {
    fn node(&self) -> &Node {
        &self.node
    }

    fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.x, self.size.y)
    }
}

/// Circle whose local bounding square starts at the local origin
#[derive(Debug, Clone, PartialEq)]
pub struct CircleEntity {
    /// Transform node
    pub node: Node,
    /// Radius
    pub radius: f32,
    /// Fill color
    pub fill: Color,
}

impl CircleEntity {
    /// Circle of the given radius at the origin
    pub fn new(radius: f32) -> Self {
        Self {
            node: Node::default(),
            radius,
            fill: Color::default(),
        }
    }

    /// Builder: place at `position`
    pub fn at(mut self, position: Vec2) -> Self {
        self.node.set_position(position);
        self
    }

    /// Builder: replace the node
    pub fn with_node(mut self, node: Node) -> Self {
        self.node = node;
        self
    }

    /// Builder: set the fill color
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }
}

impl Entity for CircleEntity {
    fn node(&self) -> &Node {
        &self.node
    }

    fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    fn local_bounds(&self) -> Rect {
        let diameter = self.radius * 2.0;
        Rect::new(0.0, 0.0, diameter, diameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_bounds() {
        let rect = RectangleEntity::new(Vec2::new(10.0, 4.0)).at(Vec2::new(3.0, 5.0));

        assert_eq!(rect.local_bounds(), Rect::new(0.0, 0.0, 10.0, 4.0));
        assert_eq!(rect.world_bounds(), Rect::new(3.0, 5.0, 10.0, 4.0));
    }

    #[test]
    fn test_circle_bounds() {
        let circle = CircleEntity::new(5.0).at(Vec2::new(-5.0, -5.0));

        assert_eq!(circle.local_bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(circle.world_bounds(), Rect::new(-5.0, -5.0, 10.0, 10.0));
    }
}
