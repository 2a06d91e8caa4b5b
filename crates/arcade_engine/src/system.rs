//! System trait and entity membership
//!
//! A system works on the subset of scene entities registered with it. The
//! membership set only stores keys; the [`Scene`] keeps ownership.

use crate::engine::EngineError;
use crate::scene::{AsAny, Entity, EntityKey, Scene};

/// Ordered set of entity keys, unique by key
///
/// Iteration follows registration order, which makes per-tick processing
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    keys: Vec<EntityKey>,
}

impl EntitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key; returns `false` if it was already present
    pub fn insert(&mut self, key: EntityKey) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Remove a key; returns `false` if it was not present
    pub fn remove(&mut self, key: EntityKey) -> bool {
        match self.keys.iter().position(|&k| k == key) {
            Some(index) => {
                self.keys.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether the key is present
    pub fn contains(&self, key: EntityKey) -> bool {
        self.keys.contains(&key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in registration order
    pub fn iter(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.keys.iter().copied()
    }

    /// Every unordered pair exactly once, never pairing a key with itself
    pub fn pairs(&self) -> impl Iterator<Item = (EntityKey, EntityKey)> + '_ {
        self.keys
            .iter()
            .enumerate()
            .flat_map(move |(i, &first)| self.keys[i + 1..].iter().map(move |&second| (first, second)))
    }
}

/// A per-tick system operating on registered entities
///
/// Systems are `'static` so an [`Engine`](crate::Engine) can hand them back
/// by concrete type.
pub trait System: AsAny {
    /// Registered entities
    fn members(&self) -> &EntitySet;

    /// Mutable access to the registered entities
    fn members_mut(&mut self) -> &mut EntitySet;

    /// Hook run once for each entity just before it is registered
    ///
    /// Systems use it to set up whatever per-entity state they keep.
    fn attach(&mut self, _key: EntityKey, _entity: &mut dyn Entity) {}

    /// Hook run after an entity is unregistered
    fn detach(&mut self, _key: EntityKey) {}

    /// Advance the system by `delta_time` seconds
    fn update(&mut self, scene: &mut Scene, delta_time: f32) -> Result<(), EngineError>;

    /// Register an entity; returns `false` if it was already registered or unknown
    fn add_entity(&mut self, scene: &mut Scene, key: EntityKey) -> bool {
        if self.members().contains(key) {
            return false;
        }
        let Some(entity) = scene.get_mut(key) else {
            log::warn!("Refusing to register unknown entity {key:?}");
            return false;
        };
        self.attach(key, entity);
        self.members_mut().insert(key)
    }

    /// Unregister an entity; returns `false` if it was not registered
    fn drop_entity(&mut self, key: EntityKey) -> bool {
        if !self.members_mut().remove(key) {
            return false;
        }
        self.detach(key);
        true
    }

    /// Unregister members whose entity has left the scene
    ///
    /// Returns how many were dropped. Each is reported once.
    fn prune(&mut self, scene: &Scene) -> usize {
        let stale: Vec<EntityKey> = self.members().iter().filter(|&key| !scene.contains(key)).collect();
        for &key in &stale {
            log::warn!("Dropping {key:?}: entity no longer in scene");
            self.drop_entity(key);
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::CircleEntity;

    #[derive(Default)]
    struct CountingSystem {
        members: EntitySet,
        attached: usize,
        detached: usize,
    }

    impl System for CountingSystem {
        fn members(&self) -> &EntitySet {
            &self.members
        }

        fn members_mut(&mut self) -> &mut EntitySet {
            &mut self.members
        }

        fn attach(&mut self, _key: EntityKey, entity: &mut dyn Entity) {
            self.attached += 1;
            entity.node_mut().set_rotation(45.0);
        }

        fn detach(&mut self, _key: EntityKey) {
            self.detached += 1;
        }

        fn update(&mut self, _scene: &mut Scene, _delta_time: f32) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[test]
    fn test_pairs_cover_each_unordered_pair_once() {
        let mut scene = Scene::new();
        let mut set = EntitySet::new();
        let keys: Vec<_> = (0..4).map(|_| scene.spawn(CircleEntity::new(1.0))).collect();
        for &key in &keys {
            set.insert(key);
        }

        let pairs: Vec<_> = set.pairs().collect();

        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(a, b)| a != b));
        assert_eq!(pairs[0], (keys[0], keys[1]));
        assert_eq!(pairs[5], (keys[2], keys[3]));
    }

    #[test]
    fn test_pairs_of_small_sets() {
        let mut scene = Scene::new();
        let mut set = EntitySet::new();
        assert_eq!(set.pairs().count(), 0);

        set.insert(scene.spawn(CircleEntity::new(1.0)));
        assert_eq!(set.pairs().count(), 0);
    }

    #[test]
    fn test_add_entity_runs_hook_once() {
        let mut scene = Scene::new();
        let key = scene.spawn(CircleEntity::new(1.0));
        let mut system = CountingSystem::default();

        assert!(system.add_entity(&mut scene, key));
        assert!(!system.add_entity(&mut scene, key));

        assert_eq!(system.attached, 1);
        assert_eq!(system.members().len(), 1);
        assert!((scene.get(key).unwrap().node().rotation - 45.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_add_unknown_entity_is_rejected() {
        let mut scene = Scene::new();
        let key = scene.spawn(CircleEntity::new(1.0));
        scene.despawn(key);
        let mut system = CountingSystem::default();

        assert!(!system.add_entity(&mut scene, key));
        assert_eq!(system.attached, 0);
    }

    #[test]
    fn test_drop_entity() {
        let mut scene = Scene::new();
        let key = scene.spawn(CircleEntity::new(1.0));
        let mut system = CountingSystem::default();
        system.add_entity(&mut scene, key);

        assert!(system.drop_entity(key));
        assert!(!system.drop_entity(key));
        assert!(system.members().is_empty());
        assert_eq!(system.detached, 1);
    }

    #[test]
    fn test_prune_drops_despawned_members_once() {
        let mut scene = Scene::new();
        let keep = scene.spawn(CircleEntity::new(1.0));
        let gone = scene.spawn(CircleEntity::new(1.0));
        let mut system = CountingSystem::default();
        system.add_entity(&mut scene, keep);
        system.add_entity(&mut scene, gone);
        scene.despawn(gone);

        assert_eq!(system.prune(&scene), 1);
        assert_eq!(system.prune(&scene), 0);

        assert!(system.members().contains(keep));
        assert!(!system.members().contains(gone));
        assert_eq!(system.detached, 1);
    }
}
