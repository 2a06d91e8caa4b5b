//! Application trait and lifecycle management

use crate::engine::Engine;

/// Application lifecycle trait
///
/// Implement this trait to drive a simulation with the engine.
pub trait Application {
    /// Error type returned by the lifecycle hooks
    ///
    /// The engine keeps it as the source of
    /// [`EngineError::Application`](crate::EngineError::Application).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Initialize the application
    ///
    /// Called once before the first step. Use this to spawn entities and
    /// register systems with [`Engine::add_system`].
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), Self::Error>;

    /// Update the application
    ///
    /// Called once per fixed step, before transforms are propagated and the
    /// registered systems run.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Fixed step length in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), Self::Error>;

    /// Whether the main loop should stop before the next step
    fn should_exit(&self) -> bool {
        false
    }

    /// Cleanup the application
    ///
    /// Called when the main loop ends, including after a failed update.
    fn cleanup(&mut self, engine: &mut Engine);
}
