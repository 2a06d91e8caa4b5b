//! Core engine implementation

use crate::{
    application::Application,
    config::{Config, ConfigError},
    physics::{CollisionConfig, CollisionError},
    scene::{EntityKey, Scene, SceneError},
    system::System,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main engine struct
///
/// Owns the scene and the registered systems and drives the application at
/// a fixed simulation rate. There is no real-time pacing: each step
/// advances simulated time by [`delta_time`](Engine::delta_time) regardless
/// of wall-clock time.
pub struct Engine {
    /// Engine configuration
    config: EngineConfig,

    /// All entities of the running application
    scene: Scene,

    /// Systems updated each step, in registration order
    systems: Vec<Box<dyn System>>,

    /// Completed simulation steps
    tick: u64,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine at {} Hz", config.tick_rate);

        Ok(Self {
            config,
            scene: Scene::new(),
            systems: Vec::new(),
            tick: 0,
        })
    }

    /// Run the main loop with the given application
    ///
    /// Steps until the application asks to exit or the configured tick limit
    /// is reached. `cleanup` runs even when a step fails.
    pub fn run<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        app.initialize(self).map_err(|e| EngineError::Application {
            context: "initialization".to_string(),
            source: Box::new(e),
        })?;

        log::info!("Starting main loop with {} systems...", self.systems.len());
        let result = self.run_loop(app);

        app.cleanup(self);
        log::info!("Engine stopped after {} ticks", self.tick);
        result
    }

    fn run_loop<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        let delta_time = self.delta_time();

        while !app.should_exit() {
            if self.config.max_ticks.is_some_and(|max| self.tick >= max) {
                log::info!("Tick limit {} reached", self.tick);
                break;
            }
            self.step(app, delta_time)?;
            self.tick += 1;
        }
        Ok(())
    }

    /// One step: application update, transform propagation, then every
    /// system in registration order
    fn step<A: Application>(&mut self, app: &mut A, delta_time: f32) -> Result<(), EngineError> {
        app.update(self, delta_time).map_err(|e| EngineError::Application {
            context: format!("update at tick {}", self.tick),
            source: Box::new(e),
        })?;

        self.scene.propagate_transforms();
        for system in &mut self.systems {
            system.update(&mut self.scene, delta_time)?;
        }
        Ok(())
    }

    /// Register a system to run after every application update
    pub fn add_system<S: System>(&mut self, system: S) {
        log::debug!("Adding system {}", std::any::type_name::<S>());
        self.systems.push(Box::new(system));
    }

    /// Remove every system of type `S`; returns `false` if there was none
    pub fn drop_system<S: System>(&mut self) -> bool {
        let before = self.systems.len();
        self.systems.retain(|system| !(**system).as_any().is::<S>());
        before != self.systems.len()
    }

    /// First registered system of type `S`
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems
            .iter()
            .find_map(|system| (**system).as_any().downcast_ref::<S>())
    }

    /// Mutable access to the first registered system of type `S`
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems
            .iter_mut()
            .find_map(|system| (**system).as_any_mut().downcast_mut::<S>())
    }

    /// A system of type `S` together with the scene it runs over
    pub fn system_and_scene_mut<S: System>(&mut self) -> Option<(&mut S, &mut Scene)> {
        let system = self
            .systems
            .iter_mut()
            .find_map(|system| (**system).as_any_mut().downcast_mut::<S>())?;
        Some((system, &mut self.scene))
    }

    /// Register an entity with the system of type `S`
    ///
    /// Returns `false` if there is no such system or it refused the entity.
    pub fn add_to_system<S: System>(&mut self, key: EntityKey) -> bool {
        match self.system_and_scene_mut::<S>() {
            Some((system, scene)) => system.add_entity(scene, key),
            None => {
                log::warn!("No {} registered for {key:?}", std::any::type_name::<S>());
                false
            }
        }
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Get mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Number of completed simulation steps
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Fixed step length in seconds
    pub fn delta_time(&self) -> f32 {
        self.config.tick_rate.recip()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation steps per second
    pub tick_rate: f32,

    /// Stop after this many steps; `None` runs until the application exits
    pub max_ticks: Option<u64>,

    /// Collision system configuration
    pub collision: CollisionConfig,
}

impl EngineConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "tick_rate must be positive and finite, got {}",
                self.tick_rate
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: None,
            collision: CollisionConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Collision handling failed
    #[error("Collision error: {0}")]
    Collision(#[from] CollisionError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Application hook failed
    #[error("Application error during {context}: {source}")]
    Application {
        /// Lifecycle hook and tick that failed
        context: String,
        /// Error returned by the application
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
