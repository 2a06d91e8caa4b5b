//! Movement system
//!
//! Integrates velocity and acceleration for registered entities once per
//! tick. Motion state lives in the system, keyed by entity, and is created
//! when an entity is registered.

use crate::engine::EngineError;
use crate::foundation::math::Vec2;
use crate::scene::{Entity, EntityKey, Scene};
use crate::system::{EntitySet, System};
use slotmap::SecondaryMap;

/// Per-entity kinematic state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    /// Linear velocity in units per second
    pub velocity: Vec2,

    /// Linear acceleration in units per second squared
    pub acceleration: Vec2,

    /// Angular velocity in degrees per second
    pub angular_velocity: f32,

    /// Angular acceleration in degrees per second squared
    pub angular_acceleration: f32,
}

impl Motion {
    /// Advance velocities by `delta_time` and return the position and
    /// rotation offsets for this step
    pub fn integrate(&mut self, delta_time: f32) -> (Vec2, f32) {
        self.velocity += self.acceleration * delta_time;
        self.angular_velocity += self.angular_acceleration * delta_time;
        (self.velocity * delta_time, self.angular_velocity * delta_time)
    }

    /// Stop all movement
    pub fn stop(&mut self) {
        *self = Self::default();
    }
}

/// Velocity and acceleration integration for registered entities
#[derive(Debug, Default)]
pub struct MovementSystem {
    members: EntitySet,
    motion: SecondaryMap<EntityKey, Motion>,
}

impl MovementSystem {
    /// Create an empty movement system
    pub fn new() -> Self {
        Self::default()
    }

    /// Motion state of a registered entity
    pub fn motion(&self, key: EntityKey) -> Option<&Motion> {
        self.motion.get(key)
    }

    /// Mutable motion state of a registered entity
    pub fn motion_mut(&mut self, key: EntityKey) -> Option<&mut Motion> {
        self.motion.get_mut(key)
    }

    /// Set the velocity of a registered entity; returns `false` if it is not registered
    pub fn set_velocity(&mut self, key: EntityKey, velocity: Vec2) -> bool {
        let Some(motion) = self.motion.get_mut(key) else {
            return false;
        };
        motion.velocity = velocity;
        true
    }

    /// Set the acceleration of a registered entity; returns `false` if it is not registered
    pub fn set_acceleration(&mut self, key: EntityKey, acceleration: Vec2) -> bool {
        let Some(motion) = self.motion.get_mut(key) else {
            return false;
        };
        motion.acceleration = acceleration;
        true
    }

    /// Stop a registered entity; returns `false` if it is not registered
    pub fn stop(&mut self, key: EntityKey) -> bool {
        let Some(motion) = self.motion.get_mut(key) else {
            return false;
        };
        motion.stop();
        true
    }
}

impl System for MovementSystem {
    fn members(&self) -> &EntitySet {
        &self.members
    }

    fn members_mut(&mut self) -> &mut EntitySet {
        &mut self.members
    }

    fn attach(&mut self, key: EntityKey, _entity: &mut dyn Entity) {
        self.motion.insert(key, Motion::default());
    }

    fn detach(&mut self, key: EntityKey) {
        self.motion.remove(key);
    }

    fn update(&mut self, scene: &mut Scene, delta_time: f32) -> Result<(), EngineError> {
        self.prune(scene);

        for key in self.members.iter() {
            let (Some(motion), Some(entity)) = (self.motion.get_mut(key), scene.get_mut(key)) else {
                continue;
            };
            let (offset, spin) = motion.integrate(delta_time);
            let node = entity.node_mut();
            node.move_by(offset);
            node.rotate_by(spin);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::logging;
    use crate::scene::{CircleEntity, RectangleEntity};
    use approx::assert_relative_eq;

    fn spawn_moving(scene: &mut Scene, system: &mut MovementSystem) -> EntityKey {
        let key = scene.spawn(RectangleEntity::new(Vec2::new(10.0, 10.0)));
        assert!(system.add_entity(scene, key));
        key
    }

    fn position(scene: &Scene, key: EntityKey) -> Vec2 {
        scene.get(key).unwrap().node().position
    }

    #[test]
    fn test_registration_creates_resting_motion() {
        let mut scene = Scene::new();
        let mut system = MovementSystem::new();
        let key = spawn_moving(&mut scene, &mut system);

        assert_eq!(system.motion(key), Some(&Motion::default()));

        assert!(system.drop_entity(key));
        assert!(system.motion(key).is_none());
        assert!(!system.set_velocity(key, Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_constant_velocity_moves_linearly() {
        let mut scene = Scene::new();
        let mut system = MovementSystem::new();
        let key = spawn_moving(&mut scene, &mut system);
        assert!(system.set_velocity(key, Vec2::new(30.0, -12.0)));

        for _ in 0..4 {
            system.update(&mut scene, 0.25).unwrap();
        }

        let moved = position(&scene, key);
        assert_relative_eq!(moved.x, 30.0, epsilon = 1e-4);
        assert_relative_eq!(moved.y, -12.0, epsilon = 1e-4);
    }

    #[test]
    fn test_acceleration_feeds_velocity_before_position() {
        let mut scene = Scene::new();
        let mut system = MovementSystem::new();
        let key = spawn_moving(&mut scene, &mut system);
        assert!(system.set_acceleration(key, Vec2::new(0.0, 2.0)));

        system.update(&mut scene, 1.0).unwrap();
        assert_relative_eq!(system.motion(key).unwrap().velocity.y, 2.0);
        assert_relative_eq!(position(&scene, key).y, 2.0);

        system.update(&mut scene, 1.0).unwrap();
        assert_relative_eq!(system.motion(key).unwrap().velocity.y, 4.0);
        assert_relative_eq!(position(&scene, key).y, 6.0);
    }

    #[test]
    fn test_angular_motion_rotates_node() {
        let mut scene = Scene::new();
        let mut system = MovementSystem::new();
        let key = spawn_moving(&mut scene, &mut system);
        let motion = system.motion_mut(key).unwrap();
        motion.angular_velocity = 90.0;
        motion.angular_acceleration = 10.0;

        system.update(&mut scene, 0.5).unwrap();

        assert_relative_eq!(system.motion(key).unwrap().angular_velocity, 95.0);
        assert_relative_eq!(scene.get(key).unwrap().node().rotation, 47.5);
    }

    #[test]
    fn test_stop_clears_all_motion() {
        let mut scene = Scene::new();
        let mut system = MovementSystem::new();
        let key = spawn_moving(&mut scene, &mut system);
        *system.motion_mut(key).unwrap() = Motion {
            velocity: Vec2::new(5.0, 5.0),
            acceleration: Vec2::new(0.0, 9.0),
            angular_velocity: 3.0,
            angular_acceleration: 1.0,
        };

        assert!(system.stop(key));
        system.update(&mut scene, 1.0).unwrap();

        assert_relative_eq!(position(&scene, key).x, 0.0);
        assert_relative_eq!(position(&scene, key).y, 0.0);
    }

    #[test]
    fn test_unregistered_entities_stay_put() {
        let mut scene = Scene::new();
        let mut system = MovementSystem::new();
        let moving = spawn_moving(&mut scene, &mut system);
        let idle = scene.spawn(CircleEntity::new(2.0).at(Vec2::new(7.0, 7.0)));
        system.set_velocity(moving, Vec2::new(1.0, 0.0));

        system.update(&mut scene, 1.0).unwrap();

        assert_relative_eq!(position(&scene, moving).x, 1.0);
        assert_relative_eq!(position(&scene, idle).x, 7.0);
    }

    #[test]
    fn test_despawned_member_is_pruned_with_its_motion() {
        logging::init_for_tests();
        let mut scene = Scene::new();
        let mut system = MovementSystem::new();
        let key = spawn_moving(&mut scene, &mut system);
        scene.despawn(key);

        system.update(&mut scene, 1.0).unwrap();

        assert!(system.members().is_empty());
        assert!(system.motion(key).is_none());
    }
}
