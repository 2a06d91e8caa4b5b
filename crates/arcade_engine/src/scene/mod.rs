//! Scene management
//!
//! Entities, their transform hierarchy, and the capability contract the
//! collision system consumes.
//!
//! ## Architecture
//!
//! ```text
//! Scene (owns entities, composes transforms)
//!      ↓  EntityKey
//! Systems (collision, game logic)
//! ```

mod entity;
mod scene_graph;
mod shapes;

pub use entity::{AsAny, Entity, Kind, Node};
pub use scene_graph::{EntityKey, Scene, SceneError};
pub use shapes::{CircleEntity, Color, RectangleEntity};
