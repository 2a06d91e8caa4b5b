//! Collision system
//!
//! Drives the per-tick scan: every unordered pair of registered entities is
//! run through the [`NarrowPhase`], and each confirmed collision is handed to
//! the [`HandlerRegistry`] before the scan moves on. There is no broad phase
//! and no state carried between ticks apart from [`TickStats`].

use super::handlers::{CollisionError, Dispatch, HandlerRegistry, HandlerResult};
use super::narrowing::{DetectionLevel, NarrowPhase, Outcome};
use crate::config::Config;
use crate::engine::EngineError;
use crate::foundation::math::Rect;
use crate::scene::{Entity, Scene};
use crate::system::{EntitySet, System};
use serde::{Deserialize, Serialize};

/// Collision configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Precision used for every pair
    pub level: DetectionLevel,
}

impl Config for CollisionConfig {}

/// Counters for the most recent tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Pairs run through the narrow phase
    pub pairs_tested: usize,
    /// Pairs confirmed colliding
    pub collisions: usize,
    /// Collisions that reached a handler
    pub dispatched: usize,
    /// Collisions with no registered handler
    pub unhandled: usize,
    /// Pairs the narrow phase refused, plus members dropped for leaving the scene
    pub rejected: usize,
}

/// Exhaustive pairwise collision detection with typed reactions
#[derive(Debug)]
pub struct CollisionSystem {
    narrow_phase: NarrowPhase,
    members: EntitySet,
    handlers: HandlerRegistry,
    last_tick: TickStats,
}

impl CollisionSystem {
    /// Create a collision system testing at `level`
    pub fn new(level: DetectionLevel) -> Self {
        Self {
            narrow_phase: NarrowPhase::new(level),
            members: EntitySet::new(),
            handlers: HandlerRegistry::new(),
            last_tick: TickStats::default(),
        }
    }

    /// Create a collision system from configuration
    pub fn from_config(config: &CollisionConfig) -> Self {
        Self::new(config.level)
    }

    /// Detection level fixed at construction
    pub fn level(&self) -> DetectionLevel {
        self.narrow_phase.level()
    }

    /// Register the reaction to collisions between `A` and `B`
    ///
    /// Replaces any handler already registered for the pair, in either order.
    pub fn add_handler<A, B, F>(&mut self, callback: F) -> bool
    where
        A: Entity,
        B: Entity,
        F: FnMut(&mut A, &mut B, &Rect) -> HandlerResult + 'static,
    {
        self.handlers.register(callback)
    }

    /// Remove the reaction to collisions between `A` and `B`
    pub fn remove_handler<A: Entity, B: Entity>(&mut self) -> bool {
        self.handlers.unregister::<A, B>()
    }

    /// Registered handlers
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Test two entities at this system's level without dispatching
    pub fn test(&self, a: &dyn Entity, b: &dyn Entity) -> Outcome {
        self.narrow_phase.test(a, b)
    }

    /// Counters from the most recent [`update`](System::update)
    pub fn last_tick(&self) -> &TickStats {
        &self.last_tick
    }

    fn scan(&mut self, scene: &mut Scene, stats: &mut TickStats) -> Result<(), CollisionError> {
        for (first, second) in self.members.pairs() {
            let (Some(a), Some(b)) = (scene.get(first), scene.get(second)) else {
                continue;
            };
            let outcome = self.narrow_phase.test(a, b);
            stats.pairs_tested += 1;
            log::trace!("Pair ({first:?}, {second:?}): {outcome:?}");

            let rect = match outcome {
                Outcome::Overlapping(rect) => rect,
                Outcome::Separated(_) => continue,
                Outcome::Rejected(_) => {
                    stats.rejected += 1;
                    continue;
                }
            };
            stats.collisions += 1;

            let Some((a, b)) = scene.pair_mut(first, second) else {
                continue;
            };
            let kinds = ((*a).kind(), (*b).kind());
            match self.handlers.dispatch(a, b, &rect)? {
                Dispatch::Handled => stats.dispatched += 1,
                Dispatch::Unhandled => {
                    log::debug!("No collision handler for ({}, {})", kinds.0.name(), kinds.1.name());
                    stats.unhandled += 1;
                }
            }
        }
        Ok(())
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::from_config(&CollisionConfig::default())
    }
}

impl System for CollisionSystem {
    fn members(&self) -> &EntitySet {
        &self.members
    }

    fn members_mut(&mut self) -> &mut EntitySet {
        &mut self.members
    }

    /// Run one scan; `delta_time` does not affect detection
    ///
    /// Members despawned since the last scan are dropped first and counted
    /// once as rejected.
    fn update(&mut self, scene: &mut Scene, _delta_time: f32) -> Result<(), EngineError> {
        let mut stats = TickStats {
            rejected: self.prune(scene),
            ..TickStats::default()
        };
        let result = self.scan(scene, &mut stats);
        self.last_tick = stats;
        result?;
        Ok(())
    }
}
