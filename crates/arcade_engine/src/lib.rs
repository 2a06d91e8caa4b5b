//! # Arcade Engine
//!
//! A small fixed-step 2D simulation engine built around collision detection
//! and typed collision reactions.
//!
//! ## Features
//!
//! - **Scene Graph**: Entities owned by a [`scene::Scene`], addressed by generational keys
//! - **Tiered Collision Detection**: Axis-aligned, oriented and separating-axis tests
//! - **Typed Handlers**: Reactions registered per pair of concrete entity types
//! - **Systems**: Collision and movement systems run by the engine every step
//! - **File Configuration**: TOML and RON engine settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arcade_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     type Error = EngineError;
//!
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), EngineError> {
//!         let mut collisions = CollisionSystem::from_config(&engine.config().collision);
//!         collisions.add_handler(|_: &mut RectangleEntity, circle: &mut CircleEntity, _: &Rect| {
//!             circle.fill = Color::RED;
//!             Ok(())
//!         });
//!
//!         let scene = engine.scene_mut();
//!         let a = scene.spawn(RectangleEntity::new(Vec2::new(10.0, 10.0)));
//!         let b = scene.spawn(CircleEntity::new(4.0).at(Vec2::new(30.0, 6.0)));
//!         collisions.add_entity(scene, a);
//!         collisions.add_entity(scene, b);
//!
//!         engine.add_system(MovementSystem::new());
//!         engine.add_system(collisions);
//!         engine.add_to_system::<MovementSystem>(b);
//!         if let Some(movement) = engine.system_mut::<MovementSystem>() {
//!             movement.set_velocity(b, Vec2::new(-20.0, 0.0));
//!         }
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), EngineError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig { max_ticks: Some(60), ..Default::default() };
//!     Engine::new(config)?.run(&mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod scene;
pub mod system;

mod application;
mod engine;

pub use application::Application;
pub use engine::{Engine, EngineConfig, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::math::{Point2, Rect, Transform, Vec2},
        physics::{
            CollisionConfig, CollisionError, CollisionSystem, DetectionLevel, HandlerError,
            HandlerResult, Motion, MovementSystem, Outcome, TickStats,
        },
        scene::{CircleEntity, Color, Entity, EntityKey, Kind, Node, RectangleEntity, Scene, SceneError},
        system::{EntitySet, System},
        Application, Engine, EngineConfig, EngineError,
    };
}
