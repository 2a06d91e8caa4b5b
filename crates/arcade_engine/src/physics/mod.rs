//! Collision detection, reaction dispatch and movement
//!
//! Detection is an exhaustive pairwise scan over the entities registered
//! with a [`CollisionSystem`], narrowed through up to three tiers of
//! increasing precision. Confirmed collisions are routed to handlers typed
//! by the two entities' concrete kinds.
//!
//! This is not a physics solver: it reports overlap and an intersection
//! rectangle, never contact normals or impulses. [`MovementSystem`] only
//! integrates velocity and acceleration.

pub mod collision_system;
pub mod handlers;
pub mod movement_system;
pub mod narrowing;

pub use collision_system::{CollisionConfig, CollisionSystem, TickStats};
pub use handlers::{CollisionError, Dispatch, HandlerError, HandlerRegistry, HandlerResult, KindPair};
pub use movement_system::{Motion, MovementSystem};
pub use narrowing::{collide, DetectionLevel, NarrowPhase, Outcome, RejectReason};
